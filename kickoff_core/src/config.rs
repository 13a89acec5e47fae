//! Match configuration.
//!
//! One immutable struct carries every tunable the components consume. It is
//! passed by reference at construction; nothing in the core reads globals.

use kickoff_env::{MatchError, Vector2};
use serde::{Deserialize, Serialize};

/// Field, entity and pacing constants for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Field width W in pixels
    pub field_width: f64,

    /// Field height H in pixels
    pub field_height: f64,

    /// Agent collision/claim radius
    pub player_radius: f64,

    pub ball_radius: f64,

    /// Agent displacement per tick per unit of action vector
    pub player_speed: f64,

    /// Ball displacement per tick per unit of kick vector
    pub ball_speed: f64,

    /// Goal mouth as fractions of H: [low, high]
    pub goal_mouth: [f64; 2],

    /// Players per team
    pub squad_size: usize,

    /// Sprites in the running animation
    pub animation_frames: u32,

    /// Walk ticks per sprite
    pub walk_delay: u32,

    /// Distance from the side lines at which the goal line is crossed
    pub goal_margin: f64,

    /// Ball offset from its carrier; x is mirrored by the carrier's facing
    pub possession_offset: Vector2,

    /// Ticks during which a kicker (or tackled carrier) cannot reclaim
    pub kick_cooldown_ticks: u32,

    /// Clamp agents to the field after collision resolution
    pub clamp_to_field: bool,

    /// Distance to the goal mouth centre inside which scripted carriers shoot
    pub shoot_radius: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            field_width: 1024.0,
            field_height: 568.0,
            player_radius: 30.0,
            ball_radius: 10.0,
            player_speed: 3.0,
            ball_speed: 5.0,
            goal_mouth: [0.3, 0.7],
            squad_size: 7,
            animation_frames: 7,
            walk_delay: 3,
            goal_margin: 10.0,
            possession_offset: Vector2::new(30.0, 15.0),
            kick_cooldown_ticks: 12,
            clamp_to_field: true,
            shoot_radius: 240.0,
        }
    }
}

impl MatchConfig {
    /// Parses a (possibly partial) JSON config and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, MatchError> {
        let config: MatchConfig = serde_json::from_str(json)
            .map_err(|e| MatchError::config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the components cannot run with.
    pub fn validate(&self) -> Result<(), MatchError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("player_radius", self.player_radius),
            ("ball_radius", self.ball_radius),
            ("player_speed", self.player_speed),
            ("ball_speed", self.ball_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MatchError::config(format!("{} must be positive, got {}", name, value)));
            }
        }

        let [lo, hi] = self.goal_mouth;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
            return Err(MatchError::config(format!(
                "goal_mouth must satisfy 0 <= lo < hi <= 1, got [{}, {}]",
                lo, hi
            )));
        }
        if !self.goal_margin.is_finite() || self.goal_margin < 0.0 || self.goal_margin * 2.0 >= self.field_width {
            return Err(MatchError::config(format!("goal_margin {} does not fit the field", self.goal_margin)));
        }
        if self.squad_size == 0 {
            return Err(MatchError::config("squad_size must be at least 1"));
        }
        if self.animation_frames == 0 || self.walk_delay == 0 {
            return Err(MatchError::config("animation_frames and walk_delay must be at least 1"));
        }

        Ok(())
    }

    /// Centre spot.
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.field_width / 2.0, self.field_height / 2.0)
    }

    /// Goal mouth y-range in pixels (inclusive).
    pub fn goal_mouth_y(&self) -> (f64, f64) {
        (self.goal_mouth[0] * self.field_height, self.goal_mouth[1] * self.field_height)
    }

    /// Distance at which an agent can claim a free ball.
    pub fn claim_distance(&self) -> f64 {
        self.player_radius + self.ball_radius
    }

    /// Length of one full walk animation cycle in ticks.
    pub fn walk_cycle(&self) -> u32 {
        self.animation_frames * self.walk_delay
    }
}
