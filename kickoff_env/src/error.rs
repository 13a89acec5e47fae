//! Error types for the Kickoff simulation.

use crate::types::Side;
use thiserror::Error;

/// Errors that abort a tick or a match setup.
///
/// A tick that fails leaves every agent, the ball and the statistics exactly
/// as they were before the tick started.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Unknown action name or code
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Wrong squad size, duplicate agent ids, mismatched sides, bad formation
    #[error("Team configuration error: {0}")]
    TeamConfiguration(String),

    /// A policy (or caller) supplied the wrong number of actions
    #[error("{side} supplied {actual} actions, expected {expected}")]
    ActionCount {
        side: Side,
        expected: usize,
        actual: usize,
    },

    /// A policy failed to decide; there is no default action
    #[error("Policy for {side} failed: {source}")]
    Policy {
        side: Side,
        #[source]
        source: PolicyError,
    },

    /// The match configuration is unusable
    #[error("Config error: {0}")]
    Config(String),
}

impl MatchError {
    /// Creates an invalid action error.
    pub fn invalid_action(what: impl std::fmt::Display) -> Self {
        Self::InvalidAction(what.to_string())
    }

    /// Creates a team configuration error.
    pub fn team(msg: impl Into<String>) -> Self {
        Self::TeamConfiguration(msg.into())
    }

    /// Creates a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors raised by a policy while deciding.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy could not produce actions (model failure, missing input, ...)
    #[error("{0}")]
    Failed(String),

    /// The policy produced something that is not an action
    #[error("invalid action: {0}")]
    InvalidAction(String),
}

impl PolicyError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

impl From<MatchError> for PolicyError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::InvalidAction(what) => PolicyError::InvalidAction(what),
            other => PolicyError::Failed(other.to_string()),
        }
    }
}
