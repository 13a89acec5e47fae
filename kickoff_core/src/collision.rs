//! Agent-agent collision resolution.
//!
//! Overlapping agents are nudged apart by a fixed push that grows as they get
//! closer. There is no momentum. Order matters and is part of the contract:
//!
//! 1. same-team pass for team 1
//! 2. same-team pass for team 2
//! 3. cross-team pass, where any contact while the ball is owned knocks it
//!    off its carrier
//!
//! Each pass visits unordered pairs once, in index order.

use crate::ball::Ball;
use crate::config::MatchConfig;
use crate::team::Team;
use kickoff_env::{AgentId, Side, Vector2};

/// What one resolution round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionReport {
    /// Overlapping same-team pairs, both teams together
    pub same_team_overlaps: usize,

    pub cross_team_overlaps: usize,

    /// Carrier that lost the ball in the cross-team pass
    pub dispossessed: Option<(Side, AgentId)>,
}

/// Pairwise separation of agents.
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    player_radius: f64,
    ball_radius: f64,
    cooldown_ticks: u32,
}

impl CollisionResolver {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            player_radius: config.player_radius,
            ball_radius: config.ball_radius,
            cooldown_ticks: config.kick_cooldown_ticks,
        }
    }

    /// Runs the three passes in contract order.
    pub fn resolve(&self, team1: &mut Team, team2: &mut Team, ball: &mut Ball) -> CollisionReport {
        let mut report = CollisionReport::default();

        report.same_team_overlaps += self.resolve_same_team(team1, ball.is_free());
        report.same_team_overlaps += self.resolve_same_team(team2, ball.is_free());

        let (cross, dispossessed) = self.resolve_cross_team(team1, team2, ball);
        report.cross_team_overlaps = cross;
        report.dispossessed = dispossessed;

        report
    }

    /// Separates teammates. While the ball is owned the x threshold widens by
    /// the ball radius so the carrier keeps room around the ball.
    ///
    /// Returns the number of overlapping pairs.
    pub fn resolve_same_team(&self, team: &mut Team, ball_free: bool) -> usize {
        let min_dx = 2.0 * self.player_radius + if ball_free { 0.0 } else { self.ball_radius };
        let min_dy = 2.0 * self.player_radius;
        let players = &mut team.players;
        let mut overlaps = 0;

        for i in 0..players.len() {
            for j in (i + 1)..players.len() {
                let (a, b) = pair_mut(players, i, j);
                if a.id == b.id {
                    continue;
                }
                if overlapping(&a.position, &b.position, min_dx, min_dy) {
                    separate(&mut a.position, &mut b.position, self.player_radius);
                    overlaps += 1;
                }
            }
        }

        overlaps
    }

    /// Separates opponents and handles tackles.
    ///
    /// Any overlapping pair while the ball is owned at the start of the pass
    /// drops the ball at its current position before the pair is pushed,
    /// wherever the carrier stands. The carrier is the one put on cooldown.
    pub fn resolve_cross_team(
        &self,
        team1: &mut Team,
        team2: &mut Team,
        ball: &mut Ball,
    ) -> (usize, Option<(Side, AgentId)>) {
        let min_dx = 2.0 * self.player_radius + self.ball_radius;
        let min_dy = 2.0 * self.player_radius;
        let ball_owned = !ball.is_free();
        let mut overlaps = 0;
        let mut dispossessed = None;

        for a in team1.players.iter_mut() {
            for b in team2.players.iter_mut() {
                if !overlapping(&a.position, &b.position, min_dx, min_dy) {
                    continue;
                }
                overlaps += 1;

                if ball_owned {
                    if let Some(lost) = ball.dispossess(self.cooldown_ticks) {
                        dispossessed = Some(lost);
                    }
                }

                separate(&mut a.position, &mut b.position, 2.0 * self.player_radius);
            }
        }

        (overlaps, dispossessed)
    }
}

/// Inclusive box test on both axes.
fn overlapping(a: &Vector2, b: &Vector2, min_dx: f64, min_dy: f64) -> bool {
    (a.x - b.x).abs() <= min_dx && (a.y - b.y).abs() <= min_dy
}

/// Pushes `a` and `b` apart on both axes. On an exact tie `a` goes `+`.
fn separate(a: &mut Vector2, b: &mut Vector2, constant: f64) {
    for axis in 0..2 {
        let d = a[axis] - b[axis];
        let sign = if d >= 0.0 { 1.0 } else { -1.0 };
        let amount = push(d, constant);
        a[axis] += sign * amount;
        b[axis] -= sign * amount;
    }
}

/// `max(0, 1 + constant - floor(|d| / 2))`
fn push(d: f64, constant: f64) -> f64 {
    (1.0 + constant - (d.abs() / 2.0).floor()).max(0.0)
}

fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::formation::Formation;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn config(squad_size: usize) -> MatchConfig {
        MatchConfig { squad_size, ..Default::default() }
    }

    fn team(side: Side, spots: &[(f64, f64)], config: &MatchConfig) -> Team {
        let players = spots
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Agent::new(id, side, Vector2::new(x, y), 0.1 * id as f64))
            .collect();
        Team::from_agents(side, players, Formation::standard(), config).unwrap()
    }

    fn separation(a: &Vector2, b: &Vector2) -> f64 {
        (a.x - b.x).abs() + (a.y - b.y).abs()
    }

    #[test]
    fn test_same_team_push_amounts() {
        let config = config(2);
        let resolver = CollisionResolver::new(&config);
        let mut t = team(Side::One, &[(100.0, 100.0), (110.0, 120.0)], &config);

        assert_eq!(resolver.resolve_same_team(&mut t, true), 1);
        assert_eq!(t.players[0].position, Vector2::new(74.0, 79.0));
        assert_eq!(t.players[1].position, Vector2::new(136.0, 141.0));
    }

    #[test]
    fn test_tie_pushes_first_agent_positive() {
        let config = config(2);
        let resolver = CollisionResolver::new(&config);
        let mut t = team(Side::Two, &[(200.0, 200.0), (200.0, 200.0)], &config);

        resolver.resolve_same_team(&mut t, true);
        assert_eq!(t.players[0].position, Vector2::new(231.0, 231.0));
        assert_eq!(t.players[1].position, Vector2::new(169.0, 169.0));
    }

    #[test]
    fn test_no_overlap_no_push() {
        let config = config(2);
        let resolver = CollisionResolver::new(&config);
        let mut t = team(Side::One, &[(100.0, 100.0), (161.0, 100.0)], &config);

        assert_eq!(resolver.resolve_same_team(&mut t, true), 0);
        assert_eq!(t.players[1].position, Vector2::new(161.0, 100.0));

        // Owned ball widens the x threshold by the ball radius
        assert_eq!(resolver.resolve_same_team(&mut t, false), 1);
    }

    #[test]
    fn test_cross_team_push_is_stronger() {
        let config = config(1);
        let resolver = CollisionResolver::new(&config);
        let mut t1 = team(Side::One, &[(500.0, 300.0)], &config);
        let mut t2 = team(Side::Two, &[(490.0, 300.0)], &config);
        let mut ball = Ball::new(config.center(), &config);

        let (overlaps, dispossessed) = resolver.resolve_cross_team(&mut t1, &mut t2, &mut ball);

        assert_eq!(overlaps, 1);
        assert_eq!(dispossessed, None);
        // 1 + 60 - floor(10 / 2) = 56 on x; 61 on y with the tie going to team 1
        assert_relative_eq!(t1.players[0].position.x, 556.0);
        assert_relative_eq!(t2.players[0].position.x, 434.0);
        assert_relative_eq!(t1.players[0].position.y, 361.0);
        assert_relative_eq!(t2.players[0].position.y, 239.0);
    }

    #[test]
    fn test_tackle_dispossesses_carrier() {
        let config = config(1);
        let resolver = CollisionResolver::new(&config);
        let mut t1 = team(Side::One, &[(500.0, 300.0)], &config);
        let mut t2 = team(Side::Two, &[(450.0, 300.0)], &config);
        let mut ball = Ball::new(Vector2::new(480.0, 315.0), &config);
        ball.give_to(Side::Two, 0);

        let (_, dispossessed) = resolver.resolve_cross_team(&mut t1, &mut t2, &mut ball);

        assert_eq!(dispossessed, Some((Side::Two, 0)));
        assert!(ball.is_free());
        assert_eq!(ball.position, Vector2::new(480.0, 315.0));
    }

    #[test]
    fn test_overlap_away_from_carrier_still_drops_ball() {
        let config = config(2);
        let resolver = CollisionResolver::new(&config);
        let mut t1 = team(Side::One, &[(500.0, 300.0), (900.0, 100.0)], &config);
        let mut t2 = team(Side::Two, &[(450.0, 300.0), (100.0, 500.0)], &config);
        let mut ball = Ball::new(Vector2::new(130.0, 515.0), &config);
        ball.give_to(Side::Two, 1);

        let (overlaps, dispossessed) = resolver.resolve_cross_team(&mut t1, &mut t2, &mut ball);

        // Only the far pair touches; the carrier across the pitch still loses it
        assert_eq!(overlaps, 1);
        assert_eq!(dispossessed, Some((Side::Two, 1)));
        assert!(ball.is_free());
        assert_eq!(ball.position, Vector2::new(130.0, 515.0));
        assert_eq!(t2.players[1].position, Vector2::new(100.0, 500.0));
    }

    #[test]
    fn test_same_team_pass_runs_before_cross_team() {
        let config = config(3);
        let resolver = CollisionResolver::new(&config);
        let t1_spots = [(372.0, 300.0), (380.0, 300.0), (900.0, 100.0)];
        let t2_spots = [(300.0, 300.0), (100.0, 500.0), (100.0, 60.0)];

        // Contract order: the teammate push shoves P into the carrier.
        let mut t1 = team(Side::One, &t1_spots, &config);
        let mut t2 = team(Side::Two, &t2_spots, &config);
        let mut ball = Ball::new(Vector2::new(330.0, 315.0), &config);
        ball.give_to(Side::Two, 0);

        let report = resolver.resolve(&mut t1, &mut t2, &mut ball);
        assert_eq!(report.same_team_overlaps, 1);
        assert_eq!(report.dispossessed, Some((Side::Two, 0)));
        assert!(ball.is_free());

        // Cross-team first: P and the carrier are 72 px apart, nothing happens.
        let mut t1 = team(Side::One, &t1_spots, &config);
        let mut t2 = team(Side::Two, &t2_spots, &config);
        let mut ball = Ball::new(Vector2::new(330.0, 315.0), &config);
        ball.give_to(Side::Two, 0);

        let (cross, dispossessed) = resolver.resolve_cross_team(&mut t1, &mut t2, &mut ball);
        resolver.resolve_same_team(&mut t1, ball.is_free());
        assert_eq!(cross, 0);
        assert_eq!(dispossessed, None);
        assert!(!ball.is_free());
    }

    #[test]
    fn test_push_never_pulls_together() {
        // Far apart on x but overlapping in the widened window
        assert_eq!(push(70.0, 30.0), 0.0);
        assert_eq!(push(0.0, 30.0), 31.0);
        assert_eq!(push(-9.0, 30.0), 27.0);
    }

    proptest! {
        #[test]
        fn test_overlapping_pair_separates(
            x in 100.0f64..900.0,
            y in 100.0f64..450.0,
            dx in -70.0f64..70.0,
            dy in -60.0f64..60.0,
            cross in any::<bool>(),
            ball_free in any::<bool>(),
        ) {
            let resolver = CollisionResolver::new(&MatchConfig::default());
            let config = config(1);
            let a = Vector2::new(x, y);
            let b = Vector2::new(x + dx, y + dy);

            if cross {
                let mut t1 = team(Side::One, &[(a.x, a.y)], &config);
                let mut t2 = team(Side::Two, &[(b.x, b.y)], &config);
                let mut ball = Ball::new(Vector2::new(20.0, 20.0), &config);
                let (overlaps, _) = resolver.resolve_cross_team(&mut t1, &mut t2, &mut ball);
                prop_assert_eq!(overlaps, 1);
                prop_assert!(separation(&t1.players[0].position, &t2.players[0].position) > separation(&a, &b));
            } else {
                let config2 = MatchConfig { squad_size: 2, ..Default::default() };
                let mut t = team(Side::One, &[(a.x, a.y), (b.x, b.y)], &config2);
                let overlaps = resolver.resolve_same_team(&mut t, ball_free);
                if overlaps == 1 {
                    prop_assert!(separation(&t.players[0].position, &t.players[1].position) > separation(&a, &b));
                } else {
                    prop_assert_eq!(t.players[0].position, a);
                    prop_assert_eq!(t.players[1].position, b);
                }
            }
        }
    }
}
