//! Harness error type.

use kickoff_env::MatchError;
use thiserror::Error;

/// Errors raised while setting up, running or exporting a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The match rejected a setup or a tick
    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scenario name that matches nothing
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// Unknown policy kind in a config or on the command line
    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),
}
