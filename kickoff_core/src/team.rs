//! A side of the match: a fixed direction, a goal and a squad of agents.

use crate::agent::Agent;
use crate::config::MatchConfig;
use crate::formation::Formation;
use crate::vector::draw_jitter;
use kickoff_env::{Action, AgentId, Facing, MatchError, Side, TeamView};
use rand::Rng;
use std::collections::HashSet;

/// One team.
///
/// `direction` and `goal_x` never change after construction, and `players`
/// always holds exactly `squad_size` agents.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    side: Side,
    direction: Facing,
    goal_x: f64,

    /// Squad in a stable order; index 0 is the keeper slot
    pub players: Vec<Agent>,

    pub formation: Formation,

    /// Whether non-controlled players should return to their slots
    pub maintain_formation: bool,
}

impl Team {
    /// Builds a team from a formation, drawing each agent's tie-break jitter
    /// from `rng`.
    pub fn new<R: Rng + ?Sized>(
        side: Side,
        formation: Formation,
        config: &MatchConfig,
        rng: &mut R,
    ) -> Result<Self, MatchError> {
        let positions = formation.positions(side.direction(), config)?;
        let players = positions
            .into_iter()
            .enumerate()
            .map(|(id, pos)| Agent::new(id, side, pos, draw_jitter(rng)))
            .collect();

        Self::from_agents(side, players, formation, config)
    }

    /// Builds a team from explicit agents, validating the squad.
    pub fn from_agents(
        side: Side,
        players: Vec<Agent>,
        formation: Formation,
        config: &MatchConfig,
    ) -> Result<Self, MatchError> {
        if players.len() != config.squad_size {
            return Err(MatchError::team(format!(
                "{} has {} players, squad size is {}",
                side,
                players.len(),
                config.squad_size
            )));
        }

        let mut seen = HashSet::new();
        for player in &players {
            if player.side != side {
                return Err(MatchError::team(format!(
                    "agent {} belongs to {} but was given to {}",
                    player.id, player.side, side
                )));
            }
            if !seen.insert(player.id) {
                return Err(MatchError::team(format!("{} has duplicate agent id {}", side, player.id)));
            }
        }

        let goal_x = match side.direction() {
            Facing::Left => config.field_width,
            Facing::Right => 0.0,
        };

        Ok(Self {
            side,
            direction: side.direction(),
            goal_x,
            players,
            formation,
            maintain_formation: true,
        })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Attacking direction.
    pub fn direction(&self) -> Facing {
        self.direction
    }

    /// x-coordinate of the goal this team defends.
    pub fn goal_x(&self) -> f64 {
        self.goal_x
    }

    pub fn player(&self, id: AgentId) -> Option<&Agent> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Index of a player in the squad order.
    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Applies one action per player, in squad order.
    ///
    /// The caller validates the action count before mutating anything.
    pub fn apply_actions(&mut self, actions: &[Action], config: &MatchConfig) {
        for (player, action) in self.players.iter_mut().zip(actions) {
            player.apply_action(*action, config);
        }
    }

    pub fn clamp_to_field(&mut self, config: &MatchConfig) {
        for player in &mut self.players {
            player.clamp_to_field(config);
        }
    }

    pub fn toggle_formation_hold(&mut self) -> bool {
        self.maintain_formation = !self.maintain_formation;
        self.maintain_formation
    }

    pub fn view(&self, config: &MatchConfig) -> TeamView {
        TeamView {
            side: self.side,
            direction: self.direction,
            goal_x: self.goal_x,
            players: self.players.iter().map(|p| p.view(config)).collect(),
            formation: self.formation.name.clone(),
            maintain_formation: self.maintain_formation,
        }
    }
}
