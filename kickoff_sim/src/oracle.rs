//! Per-tick invariant oracle.
//!
//! Watches every transition of a run and reports the first broken
//! invariant:
//! - the carrier of an owned ball exists, and a carried ball sits at its
//!   carry offset
//! - both squads keep their size and unique ids
//! - every position and velocity is finite
//! - after the ball update the ball is strictly inside the field
//! - agents stay on the field when clamping is on
//! - goal counters never fall and rise by at most one per tick

use kickoff_core::{Ball, MatchConfig, Side, Stats, Transition};
use kickoff_env::{MatchState, Possession, TeamView};
use std::collections::HashSet;

/// Allowed drift between a carried ball and its carry position.
const CARRY_EPSILON: f64 = 1e-9;

/// Checks transitions against the match invariants.
#[derive(Debug, Clone)]
pub struct InvariantOracle {
    config: MatchConfig,
    goals: [u32; 2],
    ticks_checked: u64,
}

impl InvariantOracle {
    pub fn new(config: MatchConfig) -> Self {
        Self { config, goals: [0, 0], ticks_checked: 0 }
    }

    pub fn ticks_checked(&self) -> u64 {
        self.ticks_checked
    }

    /// Checks one transition; `stats` are the statistics after it.
    pub fn check(&mut self, transition: &Transition, stats: &Stats) -> Result<(), String> {
        let state = &transition.state;
        let tick = state.tick;

        self.check_possession(&transition.state_prev, state)
            .map_err(|e| format!("tick {}: {}", tick, e))?;

        for team in [&state.team1, &state.team2] {
            self.check_squad(team).map_err(|e| format!("tick {}: {}", tick, e))?;
        }

        self.check_ball_in_field(state).map_err(|e| format!("tick {}: {}", tick, e))?;

        self.check_goals(stats).map_err(|e| format!("tick {}: {}", tick, e))?;

        self.ticks_checked += 1;
        Ok(())
    }

    fn check_possession(&self, prev: &MatchState, state: &MatchState) -> Result<(), String> {
        let Possession::Owned { side, agent } = state.ball.possession else {
            return Ok(());
        };

        let carrier = state
            .team(side)
            .player(agent)
            .ok_or_else(|| format!("ball owned by missing agent {} of {}", agent, side))?;

        // Only a carry tick re-attaches the ball; a claim leaves it in place
        if prev.ball.possession == state.ball.possession {
            let expected = Ball::carry_position(carrier.position, carrier.facing, &self.config);
            if (state.ball.position - expected).norm() > CARRY_EPSILON {
                return Err(format!(
                    "carried ball at ({:.1}, {:.1}), carrier offset says ({:.1}, {:.1})",
                    state.ball.position.x, state.ball.position.y, expected.x, expected.y
                ));
            }
        }

        Ok(())
    }

    fn check_squad(&self, team: &TeamView) -> Result<(), String> {
        if team.players.len() != self.config.squad_size {
            return Err(format!("{} has {} players", team.side, team.players.len()));
        }

        let mut ids = HashSet::new();
        for p in &team.players {
            if !ids.insert(p.id) {
                return Err(format!("{} has duplicate id {}", team.side, p.id));
            }
            if !(p.position.x.is_finite() && p.position.y.is_finite()) {
                return Err(format!("{} agent {} has a non-finite position", team.side, p.id));
            }
            if self.config.clamp_to_field {
                let on_field = (0.0..=self.config.field_width).contains(&p.position.x)
                    && (0.0..=self.config.field_height).contains(&p.position.y);
                if !on_field {
                    return Err(format!(
                        "{} agent {} left the field at ({:.1}, {:.1})",
                        team.side, p.id, p.position.x, p.position.y
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_ball_in_field(&self, state: &MatchState) -> Result<(), String> {
        let ball = &state.ball;
        if !(ball.position.iter().all(|v| v.is_finite()) && ball.velocity.iter().all(|v| v.is_finite())) {
            return Err("ball has a non-finite position or velocity".to_string());
        }

        let margin = self.config.goal_margin;
        let inside_x = ball.position.x > margin && ball.position.x < self.config.field_width - margin;
        let inside_y = ball.position.y > 0.0 && ball.position.y < self.config.field_height;
        if !(inside_x && inside_y) {
            return Err(format!(
                "ball outside the field after the update at ({:.1}, {:.1})",
                ball.position.x, ball.position.y
            ));
        }

        Ok(())
    }

    fn check_goals(&mut self, stats: &Stats) -> Result<(), String> {
        let now = [stats.goals(Side::One), stats.goals(Side::Two)];

        for (before, after) in self.goals.iter().zip(now.iter()) {
            if after < before {
                return Err(format!("goal counter fell from {} to {}", before, after));
            }
        }

        let scored: u32 = now.iter().sum::<u32>() - self.goals.iter().sum::<u32>();
        if scored > 1 {
            return Err(format!("{} goals in a single tick", scored));
        }

        self.goals = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::IdlePolicy;
    use kickoff_core::{Formation, MatchStep};
    use kickoff_env::{Action, Vector2};

    fn idle_match() -> MatchStep {
        MatchStep::new(
            MatchConfig::default(),
            21,
            Formation::diamond(),
            Formation::diamond(),
            Box::new(IdlePolicy),
            Box::new(IdlePolicy),
        )
        .unwrap()
    }

    fn one_tick(m: &mut MatchStep) -> Transition {
        m.step(&[Action::Nothing; 7], &[Action::Nothing; 7]).unwrap()
    }

    #[test]
    fn test_clean_tick_passes() {
        let mut m = idle_match();
        let mut oracle = InvariantOracle::new(m.config().clone());

        for _ in 0..10 {
            let t = one_tick(&mut m);
            assert_eq!(oracle.check(&t, m.stats()), Ok(()));
        }
        assert_eq!(oracle.ticks_checked(), 10);
    }

    #[test]
    fn test_detached_carried_ball_flagged() {
        let mut m = idle_match();
        let mut oracle = InvariantOracle::new(m.config().clone());
        m.place_ball(Vector2::new(300.0, 300.0), Some((Side::Two, 3))).unwrap();
        let mut t = one_tick(&mut m);
        assert!(oracle.check(&t, m.stats()).is_ok());

        t.state_prev = t.state.clone();
        t.state.ball.position.x += 5.0;
        let err = oracle.check(&t, m.stats()).unwrap_err();
        assert!(err.contains("carried ball"));
    }

    #[test]
    fn test_missing_carrier_flagged() {
        let mut m = idle_match();
        let mut oracle = InvariantOracle::new(m.config().clone());
        let mut t = one_tick(&mut m);

        t.state.ball.possession = Possession::Owned { side: Side::One, agent: 40 };
        assert!(oracle.check(&t, m.stats()).unwrap_err().contains("missing agent"));
    }

    #[test]
    fn test_ball_outside_field_flagged() {
        let mut m = idle_match();
        let mut oracle = InvariantOracle::new(m.config().clone());
        let mut t = one_tick(&mut m);

        t.state.ball.position = Vector2::new(5.0, 284.0);
        assert!(oracle.check(&t, m.stats()).unwrap_err().contains("outside the field"));
    }

    #[test]
    fn test_short_squad_flagged() {
        let mut m = idle_match();
        let mut oracle = InvariantOracle::new(m.config().clone());
        let mut t = one_tick(&mut m);

        t.state.team2.players.pop();
        assert!(oracle.check(&t, m.stats()).unwrap_err().contains("6 players"));
    }
}
