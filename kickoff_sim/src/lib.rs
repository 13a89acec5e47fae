//! Kickoff Deterministic Simulation Harness
//!
//! This crate drives the `kickoff_core` match from the outside: it owns the
//! policies, the seeds and the clock, and checks every tick against the
//! match invariants.
//!
//! # Core Principle: One Seed
//!
//! All sources of non-determinism come from a single 64-bit seed:
//! - **Tie-breaks**: per-agent jitter drawn when the teams are built
//! - **Policies**: one `ChaCha8Rng` stream per team
//! - **Time**: a virtual frame clock, never the wall clock
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                     SimWorld                     │
//! │  ┌────────────┐                 ┌────────────┐   │
//! │  │  Policy 1  │                 │  Policy 2  │   │
//! │  └─────┬──────┘                 └──────┬─────┘   │
//! │        │  Observation ▲    ▲ Observation │        │
//! │  ┌─────▼───────────────┴────┴────────────▼─────┐  │
//! │  │                 MatchStep                  │  │
//! │  └──────────────────────┬─────────────────────┘  │
//! │                         │ Transition             │
//! │  ┌──────────────────────▼─────────────────────┐  │
//! │  │   InvariantOracle        MatchExport       │  │
//! │  └────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use kickoff_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::Breakaway);
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod oracle;
mod policies;
mod runner;
pub mod scenarios;
pub mod selection;
mod world;

pub use context::{SimContext, DEFAULT_TICK_RATE_HZ};
pub use error::SimError;
pub use exporter::{MatchExport, MatchFrame};
pub use oracle::InvariantOracle;
pub use policies::{IdlePolicy, InputHandle, InputPolicy, ReplayPolicy, ScriptedPolicy};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{build_policy, PolicyKind, SimConfig, SimWorld};
