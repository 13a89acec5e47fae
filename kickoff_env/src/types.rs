//! Common value types shared by the core, policies and renderers.

use serde::{Deserialize, Serialize};

/// 2D point/vector in field pixels (+x east, +y south).
///
/// Arithmetic, equality and `norm()` come from nalgebra; see
/// `kickoff_core::vector` for the distance and tie-break helpers.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Identifier of an agent, unique within its team.
pub type AgentId = usize;

/// One of the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Team 1: plays toward `L`, defends the goal at `x = field_width`
    One,

    /// Team 2: plays toward `R`, defends the goal at `x = 0`
    Two,
}

impl Side {
    /// Both sides in canonical order.
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    /// Zero-based index for per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    /// The team number as shown to users (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }

    /// The other side.
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// The fixed attacking direction of this side.
    pub fn direction(self) -> Facing {
        match self {
            Side::One => Facing::Left,
            Side::Two => Facing::Right,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team{}", self.number())
    }
}

/// Horizontal facing (agents) or attacking direction (teams).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Facing {
    /// -1.0 for `L`, +1.0 for `R`.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing implied by a horizontal displacement, if it has one.
    pub fn from_dx(dx: f64) -> Option<Facing> {
        if dx < 0.0 {
            Some(Facing::Left)
        } else if dx > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// Who controls the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Possession {
    /// The ball moves under its own velocity
    #[default]
    Free,

    /// The ball is slaved to one agent
    Owned { side: Side, agent: AgentId },
}

impl Possession {
    pub fn is_free(&self) -> bool {
        matches!(self, Possession::Free)
    }

    /// The owning side, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            Possession::Free => None,
            Possession::Owned { side, .. } => Some(*side),
        }
    }

    /// True if the ball is owned by exactly this agent.
    pub fn is_owned_by(&self, side: Side, agent: AgentId) -> bool {
        *self == Possession::Owned { side, agent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::One.opponent(), Side::Two);
        assert_eq!(Side::Two.opponent(), Side::One);
        assert_eq!(Side::One.index(), 0);
        assert_eq!(Side::Two.number(), 2);
        assert_eq!(Side::One.direction(), Facing::Left);
        assert_eq!(Side::Two.to_string(), "team2");
    }

    #[test]
    fn test_facing_from_dx() {
        assert_eq!(Facing::from_dx(-3.0), Some(Facing::Left));
        assert_eq!(Facing::from_dx(3.0), Some(Facing::Right));
        assert_eq!(Facing::from_dx(0.0), None);
        assert_eq!(Facing::Left.sign(), -1.0);
    }

    #[test]
    fn test_possession_queries() {
        let owned = Possession::Owned { side: Side::Two, agent: 4 };
        assert!(!owned.is_free());
        assert_eq!(owned.side(), Some(Side::Two));
        assert!(owned.is_owned_by(Side::Two, 4));
        assert!(!owned.is_owned_by(Side::One, 4));
        assert!(Possession::default().is_free());
    }
}
