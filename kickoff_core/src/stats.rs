//! Match statistics.
//!
//! Counters are mutated only by ball-state transitions during a tick; the
//! renderer and UI read them.
//!
//! # Pass / shot bookkeeping
//!
//! A kick is classified when it happens (see [`KickKind::classify`]) and
//! stays pending until the free ball is resolved:
//!
//! | outcome               | pass      | shot    |
//! |-----------------------|-----------|---------|
//! | claimed by own side   | success   | failure |
//! | claimed by opponent   | failure   | failure |
//! | goal for kicking side | success   | success |
//! | goal for opponent     | failure   | failure |
//! | out of bounds         | failure   | failure |

use crate::config::MatchConfig;
use kickoff_env::{Facing, Side, Vector2};
use serde::{Deserialize, Serialize};

/// Success/failure tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attempts {
    pub succ: u32,
    pub fail: u32,
}

impl Attempts {
    pub fn total(&self) -> u32 {
        self.succ + self.fail
    }

    /// `succ / total`, or 0.0 with no attempts.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.succ as f64 / total as f64,
        }
    }

    fn record(&mut self, success: bool) {
        if success {
            self.succ += 1;
        } else {
            self.fail += 1;
        }
    }
}

/// How a kick is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KickKind {
    Pass,
    Shot,
}

impl KickKind {
    /// A kick is a shot when it points toward the attacked goal (non-zero x
    /// in the attacking direction) from inside the opponent half; anything
    /// else is a pass.
    pub fn classify(origin: Vector2, direction: Vector2, attack: Facing, config: &MatchConfig) -> Self {
        let halfway = config.field_width / 2.0;
        let toward_goal = direction.x * attack.sign() > 0.0;
        let in_opponent_half = match attack {
            Facing::Left => origin.x < halfway,
            Facing::Right => origin.x > halfway,
        };

        if toward_goal && in_opponent_half {
            KickKind::Shot
        } else {
            KickKind::Pass
        }
    }
}

/// A kick waiting for its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingKick {
    pub side: Side,
    pub kind: KickKind,
}

/// Per-side counters, indexed by `Side::index()`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    goals: [u32; 2],
    possession_ticks: [u64; 2],
    passes: [Attempts; 2],
    shots: [Attempts; 2],
    pending: Option<PendingKick>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goals(&self, side: Side) -> u32 {
        self.goals[side.index()]
    }

    pub fn possession_ticks(&self, side: Side) -> u64 {
        self.possession_ticks[side.index()]
    }

    pub fn passes(&self, side: Side) -> Attempts {
        self.passes[side.index()]
    }

    pub fn shots(&self, side: Side) -> Attempts {
        self.shots[side.index()]
    }

    pub fn pending_kick(&self) -> Option<PendingKick> {
        self.pending
    }

    /// Share of carried ticks per side, `(0.5, 0.5)` before any possession.
    pub fn possession_share(&self) -> (f64, f64) {
        let [one, two] = self.possession_ticks;
        let total = one + two;
        if total == 0 {
            return (0.5, 0.5);
        }
        (one as f64 / total as f64, two as f64 / total as f64)
    }

    pub fn pass_accuracy(&self, side: Side) -> f64 {
        self.passes(side).accuracy()
    }

    pub fn shot_accuracy(&self, side: Side) -> f64 {
        self.shots(side).accuracy()
    }

    // ---- transitions driven by the ball ----

    pub(crate) fn record_possession_tick(&mut self, side: Side) {
        self.possession_ticks[side.index()] += 1;
    }

    pub(crate) fn record_kick(&mut self, side: Side, kind: KickKind) {
        // A kick always follows a claim, which resolved any earlier kick.
        self.pending = Some(PendingKick { side, kind });
    }

    pub(crate) fn resolve_claim(&mut self, claimer: Side) {
        if let Some(kick) = self.pending.take() {
            let success = kick.kind == KickKind::Pass && kick.side == claimer;
            self.tally(kick, success);
        }
    }

    pub(crate) fn record_goal(&mut self, scorer: Side) {
        self.goals[scorer.index()] += 1;
        if let Some(kick) = self.pending.take() {
            self.tally(kick, kick.side == scorer);
        }
    }

    pub(crate) fn resolve_out_of_bounds(&mut self) {
        if let Some(kick) = self.pending.take() {
            self.tally(kick, false);
        }
    }

    fn tally(&mut self, kick: PendingKick, success: bool) {
        let idx = kick.side.index();
        match kick.kind {
            KickKind::Pass => self.passes[idx].record(success),
            KickKind::Shot => self.shots[idx].record(success),
        }
    }
}
