//! A single player on the field.

use crate::config::MatchConfig;
use kickoff_env::{Action, AgentId, AgentView, Facing, Side, Vector2};

/// One player.
///
/// Created once per team from a formation slot and mutated every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Unique within the team
    pub id: AgentId,

    pub side: Side,

    pub position: Vector2,

    /// Last non-zero horizontal movement direction
    pub facing: Facing,

    /// Walk animation counter; 0 while standing
    pub walk_frame_counter: u32,

    /// Fixed offset used only to order equidistant agents
    pub tie_break_jitter: f64,
}

impl Agent {
    /// Creates an agent facing its team's attacking direction.
    pub fn new(id: AgentId, side: Side, position: Vector2, tie_break_jitter: f64) -> Self {
        Self {
            id,
            side,
            position,
            facing: side.direction(),
            walk_frame_counter: 0,
            tie_break_jitter,
        }
    }

    /// Moves the agent by `action.vector() * player_speed`.
    ///
    /// No clamping happens here; the match step clamps after collisions.
    pub fn apply_action(&mut self, action: Action, config: &MatchConfig) {
        if action == Action::Nothing {
            self.walk_frame_counter = 0;
            return;
        }

        let direction = action.vector();
        self.position += direction * config.player_speed;

        if let Some(facing) = Facing::from_dx(direction.x) {
            self.facing = facing;
        }

        self.walk_frame_counter = (self.walk_frame_counter + 1) % config.walk_cycle();
    }

    /// Sprite index for the renderer.
    pub fn animation_frame(&self, config: &MatchConfig) -> u32 {
        self.walk_frame_counter / config.walk_delay
    }

    pub fn view(&self, config: &MatchConfig) -> AgentView {
        AgentView {
            id: self.id,
            side: self.side,
            position: self.position,
            facing: self.facing,
            walk_frame_counter: self.walk_frame_counter,
            animation_frame: self.animation_frame(config),
            tie_break_jitter: self.tie_break_jitter,
        }
    }

    /// Keeps the agent inside `[0, W] x [0, H]`.
    pub fn clamp_to_field(&mut self, config: &MatchConfig) {
        self.position.x = self.position.x.clamp(0.0, config.field_width);
        self.position.y = self.position.y.clamp(0.0, config.field_height);
    }
}
