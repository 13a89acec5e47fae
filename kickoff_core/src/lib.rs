//! Kickoff Core - deterministic simulation of a two-team ball game
//!
//! The core turns one action per agent into the next match state:
//! 1. **Agents** move by a fixed per-tick speed and update facing/animation
//! 2. **CollisionResolver** nudges overlapping agents apart (same team, then
//!    cross team, with dispossession of a tackled carrier)
//! 3. **Ball** carries, kicks, flies freely, gets claimed, scores or goes out
//! 4. **MatchStep** orchestrates the tick and produces immutable snapshots
//!
//! Drawing, audio, input polling and the decision policies themselves live
//! outside; they talk to the core through `kickoff_env`.

pub mod agent;
pub mod ball;
pub mod collision;
pub mod config;
pub mod formation;
pub mod match_step;
pub mod stats;
pub mod team;
pub mod vector;

// Re-export key types for convenience
pub use agent::Agent;
pub use ball::{Ball, BallEvent};
pub use collision::{CollisionReport, CollisionResolver};
pub use config::MatchConfig;
pub use formation::Formation;
pub use match_step::{MatchPhase, MatchStep, TickOutcome, Transition};
pub use stats::{Attempts, KickKind, Stats};
pub use team::Team;
pub use kickoff_env::{
    Action, AgentId, Facing, MatchError, MatchState, Possession, Side, Vector2,
};
