//! Named formation templates.
//!
//! Templates are laid out for a team attacking toward `R` (own goal at
//! `x = 0`) and mirrored for `L`. Coordinates scale with the field.

use crate::config::MatchConfig;
use kickoff_env::{Facing, MatchError, Vector2};
use serde::{Deserialize, Serialize};

/// One player's home spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// x as a fraction of the field width, measured from the team's own goal
    pub x_frac: f64,

    /// Fixed pixel offset added to `x_frac * W`
    pub x_offset: f64,

    /// y as a fraction of the field height
    pub y_frac: f64,
}

impl FormationSlot {
    pub const fn new(x_frac: f64, x_offset: f64, y_frac: f64) -> Self {
        Self { x_frac, x_offset, y_frac }
    }
}

/// A named list of slots; slot 0 is the keeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub name: String,
    pub slots: Vec<FormationSlot>,
}

impl Formation {
    /// Keeper on the goal line, three on the quarter line, two on the
    /// halfway line, one forward in the opponent half.
    pub fn standard() -> Self {
        Self {
            name: "default".to_string(),
            slots: vec![
                FormationSlot::new(0.0, 50.0, 0.5),
                FormationSlot::new(0.25, 0.0, 0.2),
                FormationSlot::new(0.25, 0.0, 0.5),
                FormationSlot::new(0.25, 0.0, 0.8),
                FormationSlot::new(0.5, 0.0, 1.0 / 3.0),
                FormationSlot::new(0.5, 0.0, 2.0 / 3.0),
                FormationSlot::new(0.75, 0.0, 0.5),
            ],
        }
    }

    /// Everyone in the own half.
    pub fn diamond() -> Self {
        Self {
            name: "diamond".to_string(),
            slots: vec![
                FormationSlot::new(0.0, 50.0, 0.5),
                FormationSlot::new(0.15, 0.0, 0.3),
                FormationSlot::new(0.15, 0.0, 0.7),
                FormationSlot::new(0.25, 0.0, 0.5),
                FormationSlot::new(0.35, 0.0, 0.25),
                FormationSlot::new(0.35, 0.0, 0.75),
                FormationSlot::new(0.45, 0.0, 0.5),
            ],
        }
    }

    /// Built-in template names.
    pub fn names() -> &'static [&'static str] {
        &["default", "diamond"]
    }

    pub fn by_name(name: &str) -> Result<Self, MatchError> {
        match name {
            "default" => Ok(Self::standard()),
            "diamond" => Ok(Self::diamond()),
            other => Err(MatchError::team(format!(
                "unknown formation '{}' (available: {})",
                other,
                Self::names().join(", ")
            ))),
        }
    }

    pub fn custom(name: impl Into<String>, slots: Vec<FormationSlot>) -> Self {
        Self { name: name.into(), slots }
    }

    /// Home position of slot `index` for a team attacking toward `direction`.
    pub fn home_position(&self, index: usize, direction: Facing, config: &MatchConfig) -> Option<Vector2> {
        let slot = self.slots.get(index)?;
        let x = slot.x_frac * config.field_width + slot.x_offset;
        let x = match direction {
            Facing::Right => x,
            Facing::Left => config.field_width - x,
        };
        Some(Vector2::new(x, slot.y_frac * config.field_height))
    }

    /// Home positions for the first `config.squad_size` slots.
    pub fn positions(&self, direction: Facing, config: &MatchConfig) -> Result<Vec<Vector2>, MatchError> {
        if self.slots.len() < config.squad_size {
            return Err(MatchError::team(format!(
                "formation '{}' has {} slots for a squad of {}",
                self.name,
                self.slots.len(),
                config.squad_size
            )));
        }

        Ok((0..config.squad_size)
            .filter_map(|idx| self.home_position(idx, direction, config))
            .collect())
    }
}

impl Default for Formation {
    fn default() -> Self {
        Self::standard()
    }
}
