//! The fixed per-agent action enumeration.

use crate::error::MatchError;
use crate::types::Vector2;
use serde::{Deserialize, Serialize};

/// One agent's action for one tick.
///
/// Every directional action moves the agent. The eight `Shoot*` variants
/// additionally kick the ball when the acting agent owns it; that part is
/// resolved by the ball, not the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[default]
    Nothing,
    MoveU,
    MoveD,
    MoveL,
    MoveR,
    ShootQ,
    ShootW,
    ShootE,
    ShootA,
    ShootD,
    ShootZ,
    ShootX,
    ShootC,
}

impl Action {
    /// All actions, indexed by their code.
    pub const ALL: [Action; 13] = [
        Action::Nothing,
        Action::MoveU,
        Action::MoveD,
        Action::MoveL,
        Action::MoveR,
        Action::ShootQ,
        Action::ShootW,
        Action::ShootE,
        Action::ShootA,
        Action::ShootD,
        Action::ShootZ,
        Action::ShootX,
        Action::ShootC,
    ];

    /// The eight kick directions.
    pub const SHOTS: [Action; 8] = [
        Action::ShootQ,
        Action::ShootW,
        Action::ShootE,
        Action::ShootA,
        Action::ShootD,
        Action::ShootZ,
        Action::ShootX,
        Action::ShootC,
    ];

    /// Direction of this action in screen coordinates (not normalised).
    pub fn vector(self) -> Vector2 {
        let (x, y) = match self {
            Action::Nothing => (0.0, 0.0),
            Action::MoveU | Action::ShootW => (0.0, -1.0),
            Action::MoveD | Action::ShootX => (0.0, 1.0),
            Action::MoveL | Action::ShootA => (-1.0, 0.0),
            Action::MoveR | Action::ShootD => (1.0, 0.0),
            Action::ShootQ => (-1.0, -1.0),
            Action::ShootE => (1.0, -1.0),
            Action::ShootZ => (-1.0, 1.0),
            Action::ShootC => (1.0, 1.0),
        };
        Vector2::new(x, y)
    }

    pub fn is_shoot(self) -> bool {
        matches!(
            self,
            Action::ShootQ
                | Action::ShootW
                | Action::ShootE
                | Action::ShootA
                | Action::ShootD
                | Action::ShootZ
                | Action::ShootX
                | Action::ShootC
        )
    }

    pub fn is_move(self) -> bool {
        matches!(self, Action::MoveU | Action::MoveD | Action::MoveL | Action::MoveR)
    }

    /// Stable numeric code (0..=12).
    pub fn code(self) -> u8 {
        Action::ALL
            .iter()
            .position(|a| *a == self)
            .map_or(0, |idx| idx as u8)
    }

    /// Canonical name, e.g. `SHOOT_D`.
    pub fn name(self) -> &'static str {
        match self {
            Action::Nothing => "NOTHING",
            Action::MoveU => "MOVE_U",
            Action::MoveD => "MOVE_D",
            Action::MoveL => "MOVE_L",
            Action::MoveR => "MOVE_R",
            Action::ShootQ => "SHOOT_Q",
            Action::ShootW => "SHOOT_W",
            Action::ShootE => "SHOOT_E",
            Action::ShootA => "SHOOT_A",
            Action::ShootD => "SHOOT_D",
            Action::ShootZ => "SHOOT_Z",
            Action::ShootX => "SHOOT_X",
            Action::ShootC => "SHOOT_C",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Action {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Action::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| MatchError::invalid_action(format!("unknown action name '{}'", s)))
    }
}

impl TryFrom<u8> for Action {
    type Error = MatchError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Action::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| MatchError::invalid_action(format!("unknown action code {}", code)))
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> u8 {
        action.code()
    }
}
