//! Reference policies.
//!
//! All of them implement [`TeamPolicy`]; the core cannot tell them apart.
//! Randomness comes from the `ChaCha8Rng` handed in at construction, so a
//! run is reproducible from its seed.

use crate::selection::{formation_direction, nearest_to_ball, select_controlled_player, shot_toward, step_toward};
use kickoff_core::{Formation, MatchConfig};
use kickoff_env::{Action, AgentView, MatchError, Observation, PolicyError, TeamPolicy, TeamView, Vector2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Action for a player that is not in control: walk back to its slot if the
/// team holds formation, otherwise stand still.
fn hold_position(
    formation: &Formation,
    config: &MatchConfig,
    team: &TeamView,
    index: usize,
    agent: &AgentView,
    rng: &mut ChaCha8Rng,
) -> Action {
    if !team.maintain_formation {
        return Action::Nothing;
    }
    match formation.home_position(index, team.direction, config) {
        Some(home) => formation_direction(agent.position, home, rng),
        None => Action::Nothing,
    }
}

/// Every player does `NOTHING`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePolicy;

impl TeamPolicy for IdlePolicy {
    fn name(&self) -> &str {
        "idle"
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
        Ok(vec![Action::Nothing; obs.own_team().players.len()])
    }
}

/// Nearest-ball chaser.
///
/// The player nearest the ball acts with probability `difficulty` each tick:
/// it runs at a free ball, dribbles a carried ball toward the opponent goal
/// and shoots once within `shoot_radius` of the goal mouth centre. The
/// others hold formation.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    formation: Formation,
    config: MatchConfig,
    difficulty: f64,
    rng: ChaCha8Rng,
}

impl ScriptedPolicy {
    /// `difficulty` is clamped to `[0, 1]`; NaN counts as 0.
    pub fn new(formation: Formation, config: MatchConfig, difficulty: f64, rng: ChaCha8Rng) -> Self {
        let difficulty = if difficulty.is_nan() { 0.0 } else { difficulty.clamp(0.0, 1.0) };
        Self { formation, config, difficulty, rng }
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    fn chase(&self, agent: &AgentView, obs: &Observation<'_>) -> Action {
        let ball = &obs.state.ball;

        if ball.possession.is_owned_by(obs.side, agent.id) {
            let target = Vector2::new(obs.opponents().goal_x, self.config.field_height / 2.0);
            let to_goal = target - ball.position;
            if to_goal.norm() <= self.config.shoot_radius {
                return shot_toward(to_goal);
            }
            return step_toward(agent.position, target);
        }

        if ball.possession.side() == Some(obs.side) {
            // A teammate has it
            return Action::Nothing;
        }

        step_toward(agent.position, ball.position)
    }
}

impl TeamPolicy for ScriptedPolicy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
        let team = obs.own_team();
        let chaser = nearest_to_ball(team, &obs.state.ball);
        let mut actions = Vec::with_capacity(team.players.len());

        for (idx, agent) in team.players.iter().enumerate() {
            let action = if Some(idx) == chaser {
                if self.rng.gen_bool(self.difficulty) {
                    self.chase(agent, obs)
                } else {
                    Action::Nothing
                }
            } else {
                hold_position(&self.formation, &self.config, team, idx, agent, &mut self.rng)
            };
            actions.push(action);
        }

        Ok(actions)
    }
}

/// Shared slot through which an input layer drives an [`InputPolicy`].
///
/// Cloneable and thread-safe: the event loop sets the current action, the
/// renderer reads which player is selected.
#[derive(Debug, Clone, Default)]
pub struct InputHandle {
    action: Arc<AtomicU8>,
    selected: Arc<AtomicUsize>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the action for the controlled player, held until changed.
    pub fn set(&self, action: Action) {
        self.action.store(action.code(), Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.set(Action::Nothing);
    }

    pub fn current(&self) -> Action {
        Action::try_from(self.action.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Index of the player selected on the last decision.
    pub fn selected(&self) -> usize {
        self.selected.load(Ordering::Relaxed)
    }
}

/// Human-controlled team without event polling.
///
/// The controlled player (see [`select_controlled_player`]) performs the
/// handle's current action; everyone else holds formation or idles.
#[derive(Debug, Clone)]
pub struct InputPolicy {
    handle: InputHandle,
    formation: Formation,
    config: MatchConfig,
    rng: ChaCha8Rng,
}

impl InputPolicy {
    pub fn new(handle: InputHandle, formation: Formation, config: MatchConfig, rng: ChaCha8Rng) -> Self {
        Self { handle, formation, config, rng }
    }

    pub fn handle(&self) -> &InputHandle {
        &self.handle
    }
}

impl TeamPolicy for InputPolicy {
    fn name(&self) -> &str {
        "input"
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
        let team = obs.own_team();
        let selected = select_controlled_player(team, &obs.state.ball, &self.config);
        if let Some(idx) = selected {
            self.handle.selected.store(idx, Ordering::Relaxed);
        }

        let mut actions = Vec::with_capacity(team.players.len());
        for (idx, agent) in team.players.iter().enumerate() {
            let action = if Some(idx) == selected {
                self.handle.current()
            } else {
                hold_position(&self.formation, &self.config, team, idx, agent, &mut self.rng)
            };
            actions.push(action);
        }

        Ok(actions)
    }
}

/// Plays back a fixed list of per-tick team actions, then idles.
#[derive(Debug, Clone, Default)]
pub struct ReplayPolicy {
    frames: VecDeque<Vec<Action>>,
}

impl ReplayPolicy {
    pub fn new(frames: Vec<Vec<Action>>) -> Self {
        Self { frames: frames.into() }
    }

    /// Builds a replay from wire action codes.
    pub fn from_codes(frames: &[Vec<u8>]) -> Result<Self, MatchError> {
        let frames = frames
            .iter()
            .map(|codes| codes.iter().map(|&c| Action::try_from(c)).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(frames))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl TeamPolicy for ReplayPolicy {
    fn name(&self) -> &str {
        "replay"
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
        Ok(self
            .frames
            .pop_front()
            .unwrap_or_else(|| vec![Action::Nothing; obs.own_team().players.len()]))
    }
}
