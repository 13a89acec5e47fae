//! The per-tick orchestrator.
//!
//! A tick runs in a fixed order:
//!
//! 1. snapshot `state_prev`
//! 2. ask each team's policy for one action per agent
//! 3. apply the actions
//! 4. collisions: same-team (team 1), same-team (team 2), cross-team
//! 5. clamp agents to the field (if configured)
//! 6. advance the ball with the raw action lists
//! 7. snapshot the new state
//!
//! Steps 1-2 run before any mutation, so a rejected tick leaves the match
//! exactly as it was.

use crate::ball::{Ball, BallEvent};
use crate::collision::CollisionResolver;
use crate::config::MatchConfig;
use crate::formation::Formation;
use crate::stats::Stats;
use crate::team::Team;
use kickoff_env::{
    Action, AgentId, MatchError, MatchState, Observation, PolicyError, Rewards, Side, TeamPolicy, Vector2,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Lifecycle of a match. Only `Running` advances physics through `tick()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Running,
    Paused,
    Ended,
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchPhase::Running => "running",
            MatchPhase::Paused => "paused",
            MatchPhase::Ended => "ended",
        };
        write!(f, "{}", name)
    }
}

/// Result of one advanced tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub state_prev: MatchState,
    pub state: MatchState,
    pub rewards: Rewards,
    pub events: Vec<BallEvent>,
}

/// What `tick()` did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Advanced(Transition),

    /// Paused or ended; nothing was mutated and no policy was queried
    Frozen(MatchPhase),
}

/// One match: two teams, a ball, the statistics and the two policies.
pub struct MatchStep {
    config: MatchConfig,
    team1: Team,
    team2: Team,
    ball: Ball,
    stats: Stats,
    resolver: CollisionResolver,
    policies: [Box<dyn TeamPolicy>; 2],
    phase: MatchPhase,
    debug: bool,
    tick: u64,
    state_prev: Option<MatchState>,
    state: MatchState,
    rewards: Option<Rewards>,
}

impl MatchStep {
    /// Builds a match from formations. Tie-break jitter for every agent is
    /// drawn from a `ChaCha8Rng` seeded with `seed`, team 1 first.
    pub fn new(
        config: MatchConfig,
        seed: u64,
        formation1: Formation,
        formation2: Formation,
        policy1: Box<dyn TeamPolicy>,
        policy2: Box<dyn TeamPolicy>,
    ) -> Result<Self, MatchError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let team1 = Team::new(Side::One, formation1, &config, &mut rng)?;
        let team2 = Team::new(Side::Two, formation2, &config, &mut rng)?;

        info!(
            "Match created: seed={}, {} ({}) vs {} ({})",
            seed,
            team1.formation.name,
            policy1.name(),
            team2.formation.name,
            policy2.name()
        );

        Self::with_teams(config, team1, team2, policy1, policy2)
    }

    /// Builds a match from prepared teams (set pieces, tests, scenarios).
    pub fn with_teams(
        config: MatchConfig,
        team1: Team,
        team2: Team,
        policy1: Box<dyn TeamPolicy>,
        policy2: Box<dyn TeamPolicy>,
    ) -> Result<Self, MatchError> {
        config.validate()?;

        for (expected, team) in [(Side::One, &team1), (Side::Two, &team2)] {
            if team.side() != expected {
                return Err(MatchError::team(format!("{} was passed in the {} slot", team.side(), expected)));
            }
            if team.players.len() != config.squad_size {
                return Err(MatchError::team(format!(
                    "{} has {} players, squad size is {}",
                    team.side(),
                    team.players.len(),
                    config.squad_size
                )));
            }
        }

        let ball = Ball::new(config.center(), &config);
        let resolver = CollisionResolver::new(&config);
        let state = MatchState {
            tick: 0,
            team1: team1.view(&config),
            team2: team2.view(&config),
            ball: ball.view(),
        };

        Ok(Self {
            config,
            team1,
            team2,
            ball,
            stats: Stats::new(),
            resolver,
            policies: [policy1, policy2],
            phase: MatchPhase::Running,
            debug: false,
            tick: 0,
            state_prev: None,
            state,
            rewards: None,
        })
    }

    /// Queries both policies and advances one tick, unless the match is
    /// paused or over.
    ///
    /// Both policies are always asked, team 1 first, before any error is
    /// returned. A failed tick leaves the match untouched, but whatever a
    /// policy keeps for itself (its RNG, its memory) has moved on for both
    /// sides alike. When both fail, team 1's error is the one reported.
    pub fn tick(&mut self) -> Result<TickOutcome, MatchError> {
        if self.phase != MatchPhase::Running {
            return Ok(TickOutcome::Frozen(self.phase));
        }

        let decided1 = self.decide(Side::One);
        let decided2 = self.decide(Side::Two);
        let (actions1, actions2) = (decided1?, decided2?);

        self.step(&actions1, &actions2).map(TickOutcome::Advanced)
    }

    fn decide(&mut self, side: Side) -> Result<Vec<Action>, MatchError> {
        let obs = Observation {
            side,
            state_prev: self.state_prev.as_ref(),
            state: &self.state,
            reward: self.rewards.as_ref(),
        };

        let policy = &mut self.policies[side.index()];
        policy.decide_team(&obs).map_err(|source| {
            warn!("Tick {} rejected: policy '{}' for {} failed: {}", self.tick, policy.name(), side, source);
            match source {
                PolicyError::InvalidAction(what) => MatchError::InvalidAction(what),
                source => MatchError::Policy { side, source },
            }
        })
    }

    /// The raw transition: applies the given actions regardless of phase.
    ///
    /// Fails without mutating anything if either list has the wrong length.
    pub fn step(&mut self, actions1: &[Action], actions2: &[Action]) -> Result<Transition, MatchError> {
        self.check_action_count(Side::One, actions1)?;
        self.check_action_count(Side::Two, actions2)?;

        let state_prev = self.state.clone();

        self.team1.apply_actions(actions1, &self.config);
        self.team2.apply_actions(actions2, &self.config);

        let mut events = Vec::new();
        let report = self.resolver.resolve(&mut self.team1, &mut self.team2, &mut self.ball);
        if let Some((side, agent)) = report.dispossessed {
            events.push(BallEvent::Dispossessed { side, agent });
        }

        if self.config.clamp_to_field {
            self.team1.clamp_to_field(&self.config);
            self.team2.clamp_to_field(&self.config);
        }

        events.extend(self.ball.update(
            &self.team1,
            &self.team2,
            actions1,
            actions2,
            &mut self.stats,
            &self.config,
        ));

        self.tick += 1;
        let state = self.snapshot();
        let rewards = Rewards::default();

        self.state_prev = Some(state_prev.clone());
        self.state = state.clone();
        self.rewards = Some(rewards);

        Ok(Transition { state_prev, state, rewards, events })
    }

    /// Like [`step`](Self::step) but takes wire action codes. An unknown code
    /// rejects the whole tick.
    pub fn step_codes(&mut self, codes1: &[u8], codes2: &[u8]) -> Result<Transition, MatchError> {
        let decode = |codes: &[u8]| -> Result<Vec<Action>, MatchError> {
            codes.iter().map(|&code| Action::try_from(code)).collect()
        };

        let decoded = decode(codes1).and_then(|a1| decode(codes2).map(|a2| (a1, a2)));
        let (actions1, actions2) = decoded.map_err(|e| {
            warn!("Tick {} rejected: {}", self.tick, e);
            e
        })?;
        self.step(&actions1, &actions2)
    }

    fn check_action_count(&self, side: Side, actions: &[Action]) -> Result<(), MatchError> {
        let expected = self.team(side).players.len();
        if actions.len() != expected {
            warn!("Tick {} rejected: {} sent {} actions for {} players", self.tick, side, actions.len(), expected);
            return Err(MatchError::ActionCount { side, expected, actual: actions.len() });
        }
        Ok(())
    }

    fn snapshot(&self) -> MatchState {
        MatchState {
            tick: self.tick,
            team1: self.team1.view(&self.config),
            team2: self.team2.view(&self.config),
            ball: self.ball.view(),
        }
    }

    /// Places the ball for a set piece, optionally at an agent's feet.
    pub fn place_ball(&mut self, position: Vector2, owner: Option<(Side, AgentId)>) -> Result<(), MatchError> {
        if let Some((side, agent)) = owner {
            if self.team(side).player(agent).is_none() {
                return Err(MatchError::team(format!("{} has no agent {}", side, agent)));
            }
        }

        self.ball.reset(position);
        if let Some((side, agent)) = owner {
            self.ball.give_to(side, agent);
        }
        self.state = self.snapshot();
        Ok(())
    }

    // ---- lifecycle ----

    /// `Running -> Paused`. Returns whether the phase changed.
    pub fn pause(&mut self) -> bool {
        self.transition(MatchPhase::Running, MatchPhase::Paused)
    }

    /// `Paused -> Running`. Returns whether the phase changed.
    pub fn resume(&mut self) -> bool {
        self.transition(MatchPhase::Paused, MatchPhase::Running)
    }

    /// Ends the match for good.
    pub fn end(&mut self) -> bool {
        if self.phase == MatchPhase::Ended {
            debug!("end() ignored: match already ended");
            return false;
        }
        info!(
            "Match ended after {} ticks ({} - {})",
            self.tick,
            self.stats.goals(Side::One),
            self.stats.goals(Side::Two)
        );
        self.phase = MatchPhase::Ended;
        true
    }

    fn transition(&mut self, from: MatchPhase, to: MatchPhase) -> bool {
        if self.phase != from {
            debug!("Ignoring {} -> {} while {}", from, to, self.phase);
            return false;
        }
        info!("Match {} at tick {}", to, self.tick);
        self.phase = to;
        true
    }

    /// Flips whether `side`'s non-controlled players hold their slots.
    /// Returns the new value.
    pub fn toggle_formation_hold(&mut self, side: Side) -> bool {
        let hold = match side {
            Side::One => self.team1.toggle_formation_hold(),
            Side::Two => self.team2.toggle_formation_hold(),
        };
        self.state = self.snapshot();
        info!("{} formation hold {}", side, if hold { "on" } else { "off" });
        hold
    }

    /// Flips the renderer's debug overlay flag.
    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.debug
    }

    // ---- read access ----

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Current snapshot; present from construction on.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn state_prev(&self) -> Option<&MatchState> {
        self.state_prev.as_ref()
    }

    pub fn rewards(&self) -> Option<&Rewards> {
        self.rewards.as_ref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::One => &self.team1,
            Side::Two => &self.team2,
        }
    }

    pub fn policy_name(&self, side: Side) -> &str {
        self.policies[side.index()].name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use kickoff_env::{Possession, PolicyError};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    struct Idle;

    impl TeamPolicy for Idle {
        fn name(&self) -> &str {
            "idle"
        }

        fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
            Ok(vec![Action::Nothing; obs.own_team().players.len()])
        }
    }

    struct Broken;

    impl TeamPolicy for Broken {
        fn decide_team(&mut self, _obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
            Err(PolicyError::failed("model offline"))
        }
    }

    struct Garbled;

    impl TeamPolicy for Garbled {
        fn decide_team(&mut self, _obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
            Err(PolicyError::InvalidAction("JUMP".to_string()))
        }
    }

    /// Records `(state_prev.tick, state.tick, reward present)` per call.
    struct Recorder(Arc<Mutex<Vec<(Option<u64>, u64, bool)>>>);

    impl TeamPolicy for Recorder {
        fn decide_team(&mut self, obs: &Observation<'_>) -> Result<Vec<Action>, PolicyError> {
            let mut log = self.0.lock().unwrap();
            log.push((obs.state_prev.map(|s| s.tick), obs.state.tick, obs.reward.is_some()));
            Ok(vec![Action::MoveU; obs.own_team().players.len()])
        }
    }

    fn default_match(seed: u64) -> MatchStep {
        MatchStep::new(
            MatchConfig::default(),
            seed,
            Formation::standard(),
            Formation::standard(),
            Box::new(Idle),
            Box::new(Idle),
        )
        .unwrap()
    }

    fn duel(t1_pos: Vector2, t2_pos: Vector2) -> MatchStep {
        let config = MatchConfig { squad_size: 1, ..Default::default() };
        let team1 = Team::from_agents(Side::One, vec![Agent::new(0, Side::One, t1_pos, 0.3)], Formation::standard(), &config).unwrap();
        let team2 = Team::from_agents(Side::Two, vec![Agent::new(0, Side::Two, t2_pos, 0.6)], Formation::standard(), &config).unwrap();
        MatchStep::with_teams(config, team1, team2, Box::new(Idle), Box::new(Idle)).unwrap()
    }

    #[test]
    fn test_state_present_from_construction() {
        let m = default_match(1);
        assert_eq!(m.state().tick, 0);
        assert!(m.state_prev().is_none());
        assert!(m.rewards().is_none());
        assert_eq!(m.state().ball.possession, Possession::Free);
        assert_eq!(m.state().team1.players.len(), 7);
        assert_eq!(m.phase(), MatchPhase::Running);
    }

    #[test]
    fn test_tick_advances_and_snapshots() {
        let mut m = default_match(1);
        let before = m.state().clone();

        let TickOutcome::Advanced(transition) = m.tick().unwrap() else {
            panic!("running match must advance");
        };

        assert_eq!(transition.state_prev, before);
        assert_eq!(transition.state.tick, 1);
        assert_eq!(transition.rewards, Rewards::default());
        assert_eq!(m.tick_count(), 1);
        assert_eq!(m.state_prev(), Some(&before));
    }

    #[test]
    fn test_policies_see_previous_state_and_reward() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut m = MatchStep::new(
            MatchConfig::default(),
            3,
            Formation::standard(),
            Formation::diamond(),
            Box::new(Recorder(log.clone())),
            Box::new(Idle),
        )
        .unwrap();

        m.tick().unwrap();
        m.tick().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(*log, vec![(None, 0, false), (Some(0), 1, true)]);
    }

    #[test]
    fn test_policy_error_propagates_without_mutation() {
        let mut m = MatchStep::new(
            MatchConfig::default(),
            5,
            Formation::standard(),
            Formation::standard(),
            Box::new(Idle),
            Box::new(Broken),
        )
        .unwrap();
        let before = m.state().clone();

        let err = m.tick().unwrap_err();
        assert!(matches!(err, MatchError::Policy { side: Side::Two, .. }));
        assert_eq!(m.state(), &before);
        assert_eq!(m.tick_count(), 0);
    }

    #[test]
    fn test_both_policies_asked_before_error() {
        for broken_side in [Side::One, Side::Two] {
            let log = Arc::new(Mutex::new(Vec::new()));
            let recorder: Box<dyn TeamPolicy> = Box::new(Recorder(log.clone()));
            let broken: Box<dyn TeamPolicy> = Box::new(Broken);
            let (policy1, policy2) = match broken_side {
                Side::One => (broken, recorder),
                Side::Two => (recorder, broken),
            };
            let mut m =
                MatchStep::new(MatchConfig::default(), 6, Formation::standard(), Formation::standard(), policy1, policy2)
                    .unwrap();
            let before = m.state().clone();

            let err = m.tick().unwrap_err();
            assert!(matches!(err, MatchError::Policy { side, .. } if side == broken_side));
            assert_eq!(log.lock().unwrap().len(), 1);
            assert_eq!(m.state(), &before);
            assert_eq!(m.tick_count(), 0);
        }
    }

    #[test]
    fn test_team_one_error_wins_when_both_fail() {
        let mut m = MatchStep::new(
            MatchConfig::default(),
            6,
            Formation::standard(),
            Formation::standard(),
            Box::new(Broken),
            Box::new(Garbled),
        )
        .unwrap();

        let err = m.tick().unwrap_err();
        assert!(matches!(err, MatchError::Policy { side: Side::One, .. }));
    }

    #[test]
    fn test_policy_invalid_action_surfaces_as_invalid_action() {
        let mut m = MatchStep::new(
            MatchConfig::default(),
            7,
            Formation::standard(),
            Formation::standard(),
            Box::new(Idle),
            Box::new(Garbled),
        )
        .unwrap();
        let before = m.state().clone();

        let err = m.tick().unwrap_err();
        assert!(matches!(&err, MatchError::InvalidAction(what) if what == "JUMP"));
        assert_eq!(m.state(), &before);
        assert_eq!(m.tick_count(), 0);
    }

    #[test]
    fn test_wrong_action_count_rejected() {
        let mut m = default_match(2);
        let before = m.state().clone();

        let err = m.step(&[Action::MoveU; 7], &[Action::MoveU; 6]).unwrap_err();
        assert!(matches!(err, MatchError::ActionCount { side: Side::Two, expected: 7, actual: 6 }));
        assert_eq!(m.state(), &before);
        assert_eq!(m.team(Side::One).players[1].position, before.team1.players[1].position);
    }

    #[test]
    fn test_unknown_action_code_rejected() {
        let mut m = default_match(2);
        let before = m.state().clone();

        let err = m.step_codes(&[0; 7], &[1, 2, 3, 4, 13, 0, 0]).unwrap_err();
        assert!(matches!(err, MatchError::InvalidAction(_)));
        assert_eq!(m.state(), &before);

        assert!(m.step_codes(&[0; 7], &[1, 2, 3, 4, 12, 0, 0]).is_ok());
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut m = default_match(4);
        m.tick().unwrap();

        assert!(m.pause());
        assert!(!m.pause());
        assert_eq!(m.tick().unwrap(), TickOutcome::Frozen(MatchPhase::Paused));
        assert_eq!(m.tick_count(), 1);

        assert!(m.resume());
        assert!(!m.resume());
        assert!(matches!(m.tick().unwrap(), TickOutcome::Advanced(_)));
        assert_eq!(m.tick_count(), 2);
    }

    #[test]
    fn test_end_is_terminal() {
        let mut m = default_match(4);
        assert!(m.end());
        assert!(!m.end());
        assert!(!m.resume());
        assert!(!m.pause());
        assert_eq!(m.tick().unwrap(), TickOutcome::Frozen(MatchPhase::Ended));

        // The raw transition still works for external drivers
        assert!(m.step(&[Action::Nothing; 7], &[Action::Nothing; 7]).is_ok());
    }

    #[test]
    fn test_toggles() {
        let mut m = default_match(6);
        assert!(!m.toggle_formation_hold(Side::Two));
        assert!(!m.state().team2.maintain_formation);
        assert!(m.state().team1.maintain_formation);

        assert!(m.toggle_debug());
        assert!(m.debug());
    }

    #[test]
    fn test_tackle_emits_dispossessed_event() {
        let mut m = duel(Vector2::new(500.0, 300.0), Vector2::new(445.0, 300.0));
        m.place_ball(Vector2::new(475.0, 315.0), Some((Side::Two, 0))).unwrap();

        let t = m.step(&[Action::Nothing], &[Action::Nothing]).unwrap();

        assert_eq!(t.events, vec![BallEvent::Dispossessed { side: Side::Two, agent: 0 }]);
        assert_eq!(t.state.ball.possession, Possession::Free);
        assert_eq!(t.state.ball.position, Vector2::new(475.0, 315.0));
        assert_eq!(t.state.team1.players[0].position, Vector2::new(534.0, 361.0));
        assert_eq!(t.state.team2.players[0].position, Vector2::new(411.0, 239.0));
    }

    #[test]
    fn test_agents_clamped_after_collision() {
        let mut m = duel(Vector2::new(5.0, 5.0), Vector2::new(1000.0, 565.0));
        m.step(&[Action::MoveU], &[Action::MoveD]).unwrap();

        assert_eq!(m.state().team1.players[0].position, Vector2::new(5.0, 2.0));
        m.step(&[Action::MoveU], &[Action::MoveD]).unwrap();
        assert_eq!(m.state().team1.players[0].position, Vector2::new(5.0, 0.0));
        assert_eq!(m.state().team2.players[0].position, Vector2::new(1000.0, 568.0));
    }

    #[test]
    fn test_place_ball_rejects_unknown_owner() {
        let mut m = default_match(1);
        assert!(m.place_ball(Vector2::new(100.0, 100.0), Some((Side::One, 42))).is_err());
        assert!(m.place_ball(Vector2::new(100.0, 100.0), None).is_ok());
        assert_eq!(m.state().ball.position, Vector2::new(100.0, 100.0));
    }

    #[test]
    fn test_with_teams_rejects_swapped_sides() {
        let config = MatchConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let team1 = Team::new(Side::One, Formation::standard(), &config, &mut rng).unwrap();
        let team2 = Team::new(Side::Two, Formation::standard(), &config, &mut rng).unwrap();

        let result = MatchStep::with_teams(config, team2, team1, Box::new(Idle), Box::new(Idle));
        assert!(matches!(result, Err(MatchError::TeamConfiguration(_))));
    }

    fn action_lists() -> impl Strategy<Value = Vec<(Vec<u8>, Vec<u8>)>> {
        prop::collection::vec(
            (prop::collection::vec(0u8..13, 7), prop::collection::vec(0u8..13, 7)),
            1..60,
        )
    }

    proptest! {
        #[test]
        fn test_step_is_deterministic(seed in any::<u64>(), ticks in action_lists()) {
            let mut a = default_match(seed);
            let mut b = default_match(seed);

            for (codes1, codes2) in &ticks {
                let ta = a.step_codes(codes1, codes2).unwrap();
                let tb = b.step_codes(codes1, codes2).unwrap();
                prop_assert_eq!(ta, tb);
            }
            prop_assert_eq!(a.stats(), b.stats());
        }

        #[test]
        fn test_possession_stays_consistent(seed in any::<u64>(), ticks in action_lists()) {
            let mut m = default_match(seed);
            let config = m.config().clone();

            for (codes1, codes2) in &ticks {
                let t = m.step_codes(codes1, codes2).unwrap();

                // A carry tick re-attaches the ball after all agent movement
                let carried = t.state_prev.ball.possession == t.state.ball.possession;
                if let (true, Possession::Owned { side, agent }) = (carried, t.state.ball.possession) {
                    let carrier = t.state.team(side).player(agent);
                    prop_assert!(carrier.is_some());
                    let carrier = carrier.unwrap();
                    let expected = Ball::carry_position(carrier.position, carrier.facing, &config);
                    prop_assert_eq!(t.state.ball.position, expected);
                }

                for p in t.state.all_players() {
                    prop_assert!((0.0..=config.field_width).contains(&p.position.x));
                    prop_assert!((0.0..=config.field_height).contains(&p.position.y));
                }
            }
        }
    }
}
