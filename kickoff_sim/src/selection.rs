//! Player selection and formation-hold steering shared by the policies.

use kickoff_core::vector::distance;
use kickoff_core::MatchConfig;
use kickoff_env::{Action, BallView, TeamView, Vector2};
use rand::Rng;

/// Within this many pixels on an axis a player counts as "in place".
pub const FORMATION_TOLERANCE: f64 = 2.0;

/// Index of the player nearest to the ball, with each player's jitter added
/// to its distance. The lower index wins an exact tie.
pub fn nearest_to_ball(team: &TeamView, ball: &BallView) -> Option<usize> {
    team.players
        .iter()
        .map(|p| distance(&p.position, &ball.position) + p.tie_break_jitter)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(idx, _)| idx)
}

/// Index of the player a human controls.
///
/// Normally the nearest player. When nobody is within claim reach and the
/// ball is within a fifth of the field of the team's own goal line, the
/// keeper (index 0) takes over.
pub fn select_controlled_player(team: &TeamView, ball: &BallView, config: &MatchConfig) -> Option<usize> {
    let nearest = nearest_to_ball(team, ball)?;
    let best = distance(&team.players[nearest].position, &ball.position) + team.players[nearest].tie_break_jitter;

    let near_own_goal = (ball.position.x - team.goal_x).abs() < config.field_width / 5.0;
    if best > config.claim_distance() && near_own_goal {
        return Some(0);
    }
    Some(nearest)
}

/// One step back toward `home`.
///
/// Aligned on an axis: move straight along the other. Otherwise pick one of
/// the two approaching moves at random.
pub fn formation_direction<R: Rng + ?Sized>(position: Vector2, home: Vector2, rng: &mut R) -> Action {
    let dx = position.x - home.x;
    let dy = position.y - home.y;
    let x_ok = dx.abs() <= FORMATION_TOLERANCE;
    let y_ok = dy.abs() <= FORMATION_TOLERANCE;

    let horizontal = if dx > 0.0 { Action::MoveL } else { Action::MoveR };
    let vertical = if dy > 0.0 { Action::MoveU } else { Action::MoveD };

    match (x_ok, y_ok) {
        (true, true) => Action::Nothing,
        (true, false) => vertical,
        (false, true) => horizontal,
        (false, false) => {
            if rng.gen_bool(0.5) {
                horizontal
            } else {
                vertical
            }
        }
    }
}

/// Greedy single-axis move from `from` toward `to`, along the longer axis.
pub fn step_toward(from: Vector2, to: Vector2) -> Action {
    let d = to - from;
    if d.x.abs() <= 1.0 && d.y.abs() <= 1.0 {
        return Action::Nothing;
    }

    if d.x.abs() >= d.y.abs() {
        if d.x < 0.0 { Action::MoveL } else { Action::MoveR }
    } else if d.y < 0.0 {
        Action::MoveU
    } else {
        Action::MoveD
    }
}

/// The `SHOOT_*` whose direction best matches `direction` (cosine).
pub fn shot_toward(direction: Vector2) -> Action {
    let cosine = |action: &Action| {
        let v = action.vector();
        let norm = v.norm() * direction.norm();
        if norm == 0.0 {
            0.0
        } else {
            v.dot(&direction) / norm
        }
    };

    Action::SHOTS
        .iter()
        .copied()
        .max_by(|a, b| cosine(a).total_cmp(&cosine(b)))
        .unwrap_or(Action::ShootD)
}
