//! Immutable match snapshots exchanged with policies and renderers.

use crate::types::{AgentId, Facing, Possession, Side, Vector2};
use serde::{Deserialize, Serialize};

/// Read-only view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub side: Side,
    pub position: Vector2,
    pub facing: Facing,

    /// Raw walk counter (wraps at `animation_frames * walk_delay`)
    pub walk_frame_counter: u32,

    /// Sprite index derived from the walk counter
    pub animation_frame: u32,

    /// Fixed per-agent offset used only to order equidistant agents
    pub tie_break_jitter: f64,
}

/// Read-only view of one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamView {
    pub side: Side,

    /// Attacking direction
    pub direction: Facing,

    /// x-coordinate of the goal this team defends
    pub goal_x: f64,

    pub players: Vec<AgentView>,
    pub formation: String,
    pub maintain_formation: bool,
}

impl TeamView {
    /// Looks up a player by id.
    pub fn player(&self, id: AgentId) -> Option<&AgentView> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Read-only view of the ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub position: Vector2,
    pub velocity: Vector2,
    pub possession: Possession,
    pub radius: f64,
}

/// Snapshot of the whole match after a tick.
///
/// Produced fresh every tick; holders must not expect it to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Number of completed ticks when the snapshot was taken
    pub tick: u64,
    pub team1: TeamView,
    pub team2: TeamView,
    pub ball: BallView,
}

impl MatchState {
    pub fn team(&self, side: Side) -> &TeamView {
        match side {
            Side::One => &self.team1,
            Side::Two => &self.team2,
        }
    }

    pub fn opponents(&self, side: Side) -> &TeamView {
        self.team(side.opponent())
    }

    /// The agent currently carrying the ball, if any.
    pub fn carrier(&self) -> Option<&AgentView> {
        match self.ball.possession {
            Possession::Free => None,
            Possession::Owned { side, agent } => self.team(side).player(agent),
        }
    }

    /// All agents of both teams, team 1 first.
    pub fn all_players(&self) -> impl Iterator<Item = &AgentView> {
        self.team1.players.iter().chain(self.team2.players.iter())
    }
}

/// Per-side reward signal.
///
/// Placeholder: the core always emits zeros. It exists so learned policies
/// have a slot for a future scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rewards {
    pub team1: f64,
    pub team2: f64,
}

impl Rewards {
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::One => self.team1,
            Side::Two => self.team2,
        }
    }
}
