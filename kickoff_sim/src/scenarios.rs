//! Named match scenarios.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// KO-001: scripted vs scripted from the standard kickoff
    Kickoff,

    /// KO-002: full-difficulty scripted teams in different formations
    Scrimmage,

    /// KO-003: every agent stacked on the centre spot
    Pileup,

    /// KO-004: displaced squads walk back to their formation slots
    FormationDrill,

    /// KO-005: a lone striker with the ball and an open goal
    Breakaway,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Kickoff,
            ScenarioId::Scrimmage,
            ScenarioId::Pileup,
            ScenarioId::FormationDrill,
            ScenarioId::Breakaway,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Kickoff => "kickoff",
            ScenarioId::Scrimmage => "scrimmage",
            ScenarioId::Pileup => "pileup",
            ScenarioId::FormationDrill => "formation_drill",
            ScenarioId::Breakaway => "breakaway",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Kickoff => "Scripted teams from kickoff; the ball must be claimed",
            ScenarioId::Scrimmage => "Difficulty 1.0, default vs diamond, invariants only",
            ScenarioId::Pileup => "14 agents on the centre spot must spread out",
            ScenarioId::FormationDrill => "Displaced players must close half the gap to their slots",
            ScenarioId::Breakaway => "Striker dribbles and shoots past an idle defence",
        }
    }

    /// Tick budget used when the caller does not override it.
    pub fn default_ticks(&self) -> u64 {
        match self {
            ScenarioId::Kickoff => 900,
            ScenarioId::Scrimmage => 1800,
            ScenarioId::Pileup => 60,
            ScenarioId::FormationDrill => 300,
            ScenarioId::Breakaway => 300,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kickoff" | "ko-001" => Ok(ScenarioId::Kickoff),
            "scrimmage" | "ko-002" => Ok(ScenarioId::Scrimmage),
            "pileup" | "pile_up" | "ko-003" => Ok(ScenarioId::Pileup),
            "formation_drill" | "formationdrill" | "ko-004" => Ok(ScenarioId::FormationDrill),
            "breakaway" | "ko-005" => Ok(ScenarioId::Breakaway),
            _ => Err(SimError::UnknownScenario(s.to_string())),
        }
    }
}
