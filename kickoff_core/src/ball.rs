//! The ball and its possession state machine.
//!
//! ```text
//!            claim (nearest agent within reach)
//!   FREE ─────────────────────────────────────────► OWNED(side, agent)
//!    ▲  ◄───────────── SHOOT_* by the carrier ─────────  │  carry: ball follows
//!    │  ◄───────────── tackle (cross-team overlap) ──────┘  the carrier
//!    │
//!    └── goal / out of bounds: reset(position) from either state
//! ```

use crate::config::MatchConfig;
use crate::stats::{KickKind, Stats};
use crate::team::Team;
use crate::vector::{distance, nearest, NearestKey};
use kickoff_env::{Action, AgentId, BallView, Facing, Possession, Side, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Something the ball did this tick. Renderers use these for sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallEvent {
    Claimed { side: Side, agent: AgentId },
    Kicked { side: Side, agent: AgentId, kind: KickKind, velocity: Vector2 },
    Dispossessed { side: Side, agent: AgentId },
    Goal { scorer: Side },
    OutOfBounds { reset_to: Vector2 },
}

/// An agent that may not claim the ball for a few ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cooldown {
    side: Side,
    agent: AgentId,
    ticks_left: u32,
}

/// The ball.
///
/// Invariant: while `Owned`, the position is re-attached to the carrier every
/// tick; while `Free`, it moves by `velocity` and no agent affects it until a
/// claim.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub position: Vector2,
    pub velocity: Vector2,
    pub radius: f64,
    possession: Possession,
    last_in_bounds: Option<Vector2>,
    cooldown: Option<Cooldown>,
}

impl Ball {
    /// Creates a free, resting ball.
    pub fn new(position: Vector2, config: &MatchConfig) -> Self {
        Self {
            position,
            velocity: Vector2::zeros(),
            radius: config.ball_radius,
            possession: Possession::Free,
            last_in_bounds: Some(position),
            cooldown: None,
        }
    }

    pub fn possession(&self) -> Possession {
        self.possession
    }

    pub fn is_free(&self) -> bool {
        self.possession.is_free()
    }

    /// Frees the ball and parks it at `position` with zero velocity.
    pub fn reset(&mut self, position: Vector2) {
        self.possession = Possession::Free;
        self.velocity = Vector2::zeros();
        self.position = position;
    }

    /// Hands the ball to an agent directly (set pieces, tests).
    pub fn give_to(&mut self, side: Side, agent: AgentId) {
        self.possession = Possession::Owned { side, agent };
        self.velocity = Vector2::zeros();
    }

    /// Tackle: drops the ball where it is and keeps the ex-carrier from
    /// reclaiming it for `cooldown_ticks`.
    ///
    /// Returns the dispossessed carrier, or `None` if the ball was free.
    pub fn dispossess(&mut self, cooldown_ticks: u32) -> Option<(Side, AgentId)> {
        let Possession::Owned { side, agent } = self.possession else {
            return None;
        };

        self.reset(self.position);
        self.start_cooldown(side, agent, cooldown_ticks);
        debug!("{} agent {} dispossessed at ({:.1}, {:.1})", side, agent, self.position.x, self.position.y);
        Some((side, agent))
    }

    /// Where the ball sits relative to a carrier.
    pub fn carry_position(carrier_pos: Vector2, facing: Facing, config: &MatchConfig) -> Vector2 {
        let offset = config.possession_offset;
        carrier_pos + Vector2::new(facing.sign() * offset.x, offset.y)
    }

    /// Advances the ball by one tick.
    ///
    /// Order: cooldown, carry or kick, free motion, boundaries (a reset ends
    /// the update), claim, then remember the in-bounds position.
    pub fn update(
        &mut self,
        team1: &Team,
        team2: &Team,
        actions1: &[Action],
        actions2: &[Action],
        stats: &mut Stats,
        config: &MatchConfig,
    ) -> Vec<BallEvent> {
        let mut events = Vec::new();
        self.tick_cooldown();

        if let Possession::Owned { side, agent } = self.possession {
            let (team, actions) = match side {
                Side::One => (team1, actions1),
                Side::Two => (team2, actions2),
            };

            match team.index_of(agent) {
                Some(idx) => {
                    let carrier = &team.players[idx];
                    self.position = Self::carry_position(carrier.position, carrier.facing, config);

                    let action = actions.get(idx).copied().unwrap_or_default();
                    if action.is_shoot() {
                        let kind = KickKind::classify(self.position, action.vector(), team.direction(), config);
                        self.possession = Possession::Free;
                        self.velocity = action.vector() * config.ball_speed;
                        self.start_cooldown(side, agent, config.kick_cooldown_ticks);
                        stats.record_kick(side, kind);
                        debug!("{} agent {} kicks ({:?}) {}", side, agent, kind, action);
                        events.push(BallEvent::Kicked { side, agent, kind, velocity: self.velocity });
                    } else {
                        stats.record_possession_tick(side);
                    }
                }
                None => {
                    // Carrier no longer on the pitch: drop the ball where it is.
                    self.reset(self.position);
                }
            }
        }

        if self.is_free() {
            self.position += self.velocity;
        }

        if let Some(event) = self.check_boundaries(team1, team2, stats, config) {
            events.push(event);
            return events;
        }

        if self.is_free() {
            if let Some(claim) = self.find_claimant(team1, team2, config) {
                self.possession = Possession::Owned { side: claim.side, agent: claim.id };
                self.velocity = Vector2::zeros();
                stats.resolve_claim(claim.side);
                debug!("{} agent {} claims the ball at distance {:.1}", claim.side, claim.id, claim.distance);
                events.push(BallEvent::Claimed { side: claim.side, agent: claim.id });
            }
        }

        self.last_in_bounds = Some(self.position);
        events
    }

    /// Nearest eligible agent within claim reach.
    fn find_claimant(&self, team1: &Team, team2: &Team, config: &MatchConfig) -> Option<NearestKey> {
        let reach = config.claim_distance();
        let candidates = team1
            .players
            .iter()
            .chain(team2.players.iter())
            .filter(|p| !self.on_cooldown(p.side, p.id))
            .map(|p| NearestKey::new(distance(&p.position, &self.position), p.tie_break_jitter, p.side, p.id))
            .filter(|key| key.distance <= reach);

        nearest(candidates)
    }

    /// Goal or out-of-bounds handling. Boundaries are inclusive.
    fn check_boundaries(
        &mut self,
        team1: &Team,
        team2: &Team,
        stats: &mut Stats,
        config: &MatchConfig,
    ) -> Option<BallEvent> {
        let (x, y) = (self.position.x, self.position.y);
        let (mouth_lo, mouth_hi) = config.goal_mouth_y();
        let left_line = x <= config.goal_margin;
        let right_line = x >= config.field_width - config.goal_margin;

        if (left_line || right_line) && (mouth_lo..=mouth_hi).contains(&y) {
            // The goal crossed belongs to whichever team defends that end.
            let halfway = config.field_width / 2.0;
            let defender = if (team1.goal_x() < halfway) == left_line { team1.side() } else { team2.side() };
            let scorer = defender.opponent();

            stats.record_goal(scorer);
            self.reset(config.center());
            self.cooldown = None;
            info!(
                "GOAL for {} ({} - {})",
                scorer,
                stats.goals(Side::One),
                stats.goals(Side::Two)
            );
            return Some(BallEvent::Goal { scorer });
        }

        if left_line || right_line || y <= 0.0 || y >= config.field_height {
            let reset_to = self.last_in_bounds.unwrap_or_else(|| config.center());
            stats.resolve_out_of_bounds();
            self.reset(reset_to);
            debug!("Ball out at ({:.1}, {:.1}); reset to ({:.1}, {:.1})", x, y, reset_to.x, reset_to.y);
            return Some(BallEvent::OutOfBounds { reset_to });
        }

        None
    }

    fn start_cooldown(&mut self, side: Side, agent: AgentId, ticks: u32) {
        self.cooldown = (ticks > 0).then_some(Cooldown { side, agent, ticks_left: ticks });
    }

    fn tick_cooldown(&mut self) {
        if let Some(cooldown) = &mut self.cooldown {
            cooldown.ticks_left = cooldown.ticks_left.saturating_sub(1);
            if cooldown.ticks_left == 0 {
                self.cooldown = None;
            }
        }
    }

    fn on_cooldown(&self, side: Side, agent: AgentId) -> bool {
        self.cooldown.is_some_and(|c| c.side == side && c.agent == agent)
    }

    pub fn view(&self) -> BallView {
        BallView {
            position: self.position,
            velocity: self.velocity,
            possession: self.possession,
            radius: self.radius,
        }
    }
}
