//! JSON frame exporter for external renderers.
//!
//! Writes every tick of a run as a frame (snapshot, statistics, ball events)
//! so a separate viewer can draw the match.

use crate::error::SimError;
use kickoff_core::{BallEvent, MatchState, Side, Stats};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single frame of match data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFrame {
    pub tick: u64,

    /// Virtual time in seconds
    pub time_sec: f64,

    pub state: MatchState,

    pub stats: Stats,

    /// Ball events of this tick (kick, claim, goal...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<BallEvent>,
}

/// Complete export of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<MatchFrame>,

    /// Final results
    pub passed: bool,

    /// Goals as `[team1, team2]`
    pub final_score: [u32; 2],
}

impl MatchExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            final_score: [0, 0],
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: MatchFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, stats: &Stats) {
        self.passed = passed;
        self.final_score = [stats.goals(Side::One), stats.goals(Side::Two)];
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
