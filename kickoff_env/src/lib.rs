//! Kickoff Environment Layer
//!
//! This crate is the seam between the simulation core and everything the
//! core treats as an external collaborator:
//! - **Policies** (human input, scripted heuristics, learned models) see the
//!   match only through the immutable [`MatchState`] snapshot and answer with
//!   [`Action`]s through the [`TeamPolicy`] capability.
//! - **Renderers** read the same snapshot (positions, facing, walk frames).
//!
//! Nothing here advances the simulation. The core depends on this crate,
//! never the other way round, so a policy can be written against
//! `kickoff_env` alone.
//!
//! # Example
//!
//! ```ignore
//! use kickoff_env::{Action, Observation, PolicyError, TeamPolicy};
//!
//! struct StandStill;
//!
//! impl TeamPolicy for StandStill {
//!     fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
//!         Ok(vec![Action::Nothing; obs.own_team().players.len()])
//!     }
//! }
//! ```

mod action;
mod error;
mod policy;
mod state;
mod types;

pub use action::Action;
pub use error::{MatchError, PolicyError};
pub use policy::{AgentPolicy, Observation, PerAgent, TeamPolicy};
pub use state::{AgentView, BallView, MatchState, Rewards, TeamView};
pub use types::{AgentId, Facing, Possession, Side, Vector2};
