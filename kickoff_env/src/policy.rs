//! Policy capability traits.

use crate::action::Action;
use crate::error::PolicyError;
use crate::state::{AgentView, MatchState, Rewards, TeamView};
use crate::types::Side;

/// Everything a policy may look at when deciding.
///
/// `state_prev` and `reward` are `None` before the first tick; `state` is
/// always present because the core snapshots at construction.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// The side the policy plays for
    pub side: Side,

    /// Snapshot taken at the start of the previous tick
    pub state_prev: Option<&'a MatchState>,

    /// Snapshot taken at the end of the previous tick
    pub state: &'a MatchState,

    /// Reward emitted by the previous tick
    pub reward: Option<&'a Rewards>,
}

impl<'a> Observation<'a> {
    pub fn own_team(&self) -> &'a TeamView {
        self.state.team(self.side)
    }

    pub fn opponents(&self) -> &'a TeamView {
        self.state.opponents(self.side)
    }
}

/// The single capability the core holds for each team.
///
/// Implementations: scripted heuristics, human input, learned models. The
/// core never knows which one it is talking to. `decide_team` must return
/// exactly one action per player, in the team's player order.
///
/// Policies run synchronously inside a tick; one that blocks stalls the
/// whole simulation.
pub trait TeamPolicy: Send {
    /// Human-readable policy name (for logs).
    fn name(&self) -> &str {
        "policy"
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError>;
}

impl<P: TeamPolicy + ?Sized> TeamPolicy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
        (**self).decide_team(obs)
    }
}

/// Per-agent variant of [`TeamPolicy`].
pub trait AgentPolicy: Send {
    fn decide(&mut self, agent: &AgentView, obs: &Observation<'_>) -> Result<Action, PolicyError>;
}

/// Adapts one [`AgentPolicy`] per player into a [`TeamPolicy`].
///
/// Policies are matched to players by position in the team order.
pub struct PerAgent<P> {
    policies: Vec<P>,
}

impl<P: AgentPolicy> PerAgent<P> {
    pub fn new(policies: Vec<P>) -> Self {
        Self { policies }
    }

    /// Builds `count` policies from a factory taking the player index.
    pub fn from_fn(count: usize, factory: impl FnMut(usize) -> P) -> Self {
        Self::new((0..count).map(factory).collect())
    }
}

impl<P: AgentPolicy> TeamPolicy for PerAgent<P> {
    fn name(&self) -> &str {
        "per_agent"
    }

    fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
        let players = &obs.own_team().players;
        if players.len() != self.policies.len() {
            return Err(PolicyError::failed(format!(
                "{} agent policies for {} players",
                self.policies.len(),
                players.len()
            )));
        }

        players
            .iter()
            .zip(self.policies.iter_mut())
            .map(|(player, policy)| policy.decide(player, obs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BallView;
    use crate::types::{Possession, Vector2};

    struct TowardBall;

    impl AgentPolicy for TowardBall {
        fn decide(&mut self, agent: &AgentView, obs: &Observation<'_>) -> Result<Action, PolicyError> {
            if obs.state.ball.position.x < agent.position.x {
                Ok(Action::MoveL)
            } else {
                Ok(Action::MoveR)
            }
        }
    }

    fn sample_state() -> MatchState {
        let player = |id, x| AgentView {
            id,
            side: Side::One,
            position: Vector2::new(x, 0.0),
            facing: crate::types::Facing::Left,
            walk_frame_counter: 0,
            animation_frame: 0,
            tie_break_jitter: 0.0,
        };
        let team = |side, players| TeamView {
            side,
            direction: crate::types::Facing::Left,
            goal_x: 0.0,
            players,
            formation: "default".to_string(),
            maintain_formation: false,
        };
        MatchState {
            tick: 0,
            team1: team(Side::One, vec![player(0, 10.0), player(1, 90.0)]),
            team2: team(Side::Two, vec![]),
            ball: BallView {
                position: Vector2::new(50.0, 0.0),
                velocity: Vector2::zeros(),
                possession: Possession::Free,
                radius: 10.0,
            },
        }
    }

    #[test]
    fn test_per_agent_adapter_orders_actions() {
        let state = sample_state();
        let obs = Observation { side: Side::One, state_prev: None, state: &state, reward: None };
        let mut policy = PerAgent::from_fn(2, |_| TowardBall);

        let actions = policy.decide_team(&obs).unwrap();
        assert_eq!(actions, vec![Action::MoveR, Action::MoveL]);
    }

    #[test]
    fn test_per_agent_adapter_rejects_size_mismatch() {
        let state = sample_state();
        let obs = Observation { side: Side::One, state_prev: None, state: &state, reward: None };
        let mut policy = PerAgent::from_fn(3, |_| TowardBall);

        assert!(matches!(policy.decide_team(&obs), Err(PolicyError::Failed(_))));
    }
}
