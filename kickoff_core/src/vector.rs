//! Vector helpers and deterministic nearest-agent selection.
//!
//! `Vector2` itself is nalgebra's; this module adds the distance helper and
//! the tie-break ordering used whenever "nearest agent" must be unique.

use kickoff_env::{AgentId, Side, Vector2};
use rand::Rng;
use std::cmp::Ordering;

/// Euclidean distance between two points.
pub fn distance(a: &Vector2, b: &Vector2) -> f64 {
    (a - b).norm()
}

/// Draws a tie-break jitter in `[0, 1)`.
pub fn draw_jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Total ordering key for "nearest agent" queries.
///
/// Compared lexicographically on `(distance, jitter, side, id)`. Distance
/// decides; jitter breaks exact ties; side and id only matter if two agents
/// were handed the same jitter. Iteration order never decides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestKey {
    pub distance: f64,
    pub jitter: f64,
    pub side: Side,
    pub id: AgentId,
}

impl NearestKey {
    pub fn new(distance: f64, jitter: f64, side: Side, id: AgentId) -> Self {
        Self { distance, jitter, side, id }
    }

    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.jitter.total_cmp(&other.jitter))
            .then(self.side.cmp(&other.side))
            .then(self.id.cmp(&other.id))
    }
}

/// Returns the minimum key, if any.
pub fn nearest(keys: impl IntoIterator<Item = NearestKey>) -> Option<NearestKey> {
    keys.into_iter().min_by(|a, b| a.cmp_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(3.0, 4.0);
        assert_relative_eq!(distance(&a, &b), 5.0);
        assert_relative_eq!(distance(&b, &a), 5.0);
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(0.5, -1.0);
        assert_eq!(a + b, Vector2::new(1.5, 1.0));
        assert_eq!(a - b, Vector2::new(0.5, 3.0));
        assert_eq!(a * 3.0, Vector2::new(3.0, 6.0));
    }

    #[test]
    fn test_nearest_prefers_distance_then_jitter() {
        let far = NearestKey::new(20.0, 0.0, Side::One, 0);
        let near_high_jitter = NearestKey::new(10.0, 0.9, Side::One, 1);
        let near_low_jitter = NearestKey::new(10.0, 0.1, Side::Two, 5);

        let pick = nearest([far, near_high_jitter, near_low_jitter]).unwrap();
        assert_eq!((pick.side, pick.id), (Side::Two, 5));

        // Same answer regardless of input order
        let pick = nearest([near_low_jitter, far, near_high_jitter]).unwrap();
        assert_eq!((pick.side, pick.id), (Side::Two, 5));
    }

    #[test]
    fn test_nearest_falls_back_to_side_and_id() {
        let a = NearestKey::new(10.0, 0.5, Side::Two, 0);
        let b = NearestKey::new(10.0, 0.5, Side::One, 3);
        assert_eq!(nearest([a, b]).unwrap().side, Side::One);
        assert!(nearest(Vec::new()).is_none());
    }

    #[test]
    fn test_jitter_is_seeded() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let j1 = draw_jitter(&mut rng1);
        assert_eq!(j1, draw_jitter(&mut rng2));
        assert!((0.0..1.0).contains(&j1));
    }
}
