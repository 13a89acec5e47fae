//! Scenario runner - sets up named matches, runs them under the invariant
//! oracle and judges the outcome.

use crate::context::{SimContext, DEFAULT_TICK_RATE_HZ};
use crate::error::SimError;
use crate::exporter::MatchExport;
use crate::oracle::InvariantOracle;
use crate::policies::{IdlePolicy, ScriptedPolicy};
use crate::scenarios::ScenarioId;
use crate::world::{PolicyKind, SimConfig, SimWorld};

use kickoff_core::vector::{distance, draw_jitter};
use kickoff_core::{
    Agent, Attempts, Ball, BallEvent, Formation, MatchConfig, MatchError, MatchStep, Side, Stats, Team,
    TickOutcome,
};
use kickoff_env::{MatchState, Vector2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::f64::consts::TAU;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the run kept every invariant and met the scenario goal
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final virtual time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    /// Goals as `[team1, team2]`
    pub goals: [u32; 2],

    pub possession_share: (f64, f64),

    pub passes: [Attempts; 2],

    pub shots: [Attempts; 2],

    pub claims: u64,

    pub kicks: u64,

    pub dispossessions: u64,

    pub out_of_bounds: u64,

    /// Bounding box width plus height over all agents, `(start, end)`
    pub spread: (f64, f64),

    /// Mean distance of agents to their formation slots, `(start, end)`
    pub formation_error: (f64, f64),
}

impl ScenarioMetrics {
    fn observe(&mut self, events: &[BallEvent]) {
        for event in events {
            match event {
                BallEvent::Claimed { .. } => self.claims += 1,
                BallEvent::Kicked { .. } => self.kicks += 1,
                BallEvent::Dispossessed { .. } => self.dispossessions += 1,
                BallEvent::OutOfBounds { .. } => self.out_of_bounds += 1,
                BallEvent::Goal { .. } => {}
            }
        }
    }

    fn record_stats(&mut self, stats: &Stats) {
        self.goals = [stats.goals(Side::One), stats.goals(Side::Two)];
        self.possession_share = stats.possession_share();
        self.passes = [stats.passes(Side::One), stats.passes(Side::Two)];
        self.shots = [stats.shots(Side::One), stats.shots(Side::Two)];
    }
}

/// Runs named scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Overrides the scenario's own tick budget
    ticks: Option<u64>,

    /// Virtual frame rate
    tick_rate_hz: u32,

    match_config: MatchConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ticks: None,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            match_config: MatchConfig::default(),
        }
    }

    /// Sets the tick budget for every scenario.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Sets the tick rate.
    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Sets the match configuration.
    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.execute(scenario, false).0
    }

    /// Runs a scenario while recording every tick.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, Option<MatchExport>) {
        self.execute(scenario, true)
    }

    fn execute(&self, scenario: ScenarioId, export: bool) -> (ScenarioResult, Option<MatchExport>) {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        let budget = self.ticks.unwrap_or_else(|| scenario.default_ticks());

        let mut world = match self.prepare(scenario, budget) {
            Ok(world) => world,
            Err(e) => {
                warn!("Setup of {} failed: {}", scenario.name(), e);
                let result = ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    total_ticks: 0,
                    final_time_secs: 0.0,
                    failure_reason: Some(format!("setup failed: {}", e)),
                    metrics: ScenarioMetrics::default(),
                };
                return (result, None);
            }
        };
        if export {
            world.enable_export(scenario.name());
        }

        let mut metrics = ScenarioMetrics {
            spread: (spread(world.match_step().state()), 0.0),
            formation_error: (formation_error(world.match_step()), 0.0),
            ..Default::default()
        };
        let mut oracle = InvariantOracle::new(world.match_step().config().clone());
        let mut failure = None;
        let mut ticks = 0;

        while ticks < budget {
            match world.step() {
                Ok(TickOutcome::Advanced(transition)) => {
                    ticks += 1;
                    metrics.observe(&transition.events);
                    if let Err(e) = oracle.check(&transition, world.match_step().stats()) {
                        failure = Some(e);
                        break;
                    }
                }
                Ok(TickOutcome::Frozen(phase)) => {
                    failure = Some(format!("match {} after {} ticks", phase, ticks));
                    break;
                }
                Err(e) => {
                    failure = Some(format!("tick {} rejected: {}", ticks + 1, e));
                    break;
                }
            }

            if ticks % 300 == 0 {
                let stats = world.match_step().stats();
                debug!(
                    "  t={:.1}s | score {} - {} | claims={}",
                    world.context.time_secs(),
                    stats.goals(Side::One),
                    stats.goals(Side::Two),
                    metrics.claims
                );
            }
        }

        metrics.record_stats(world.match_step().stats());
        metrics.spread.1 = spread(world.match_step().state());
        metrics.formation_error.1 = formation_error(world.match_step());

        if failure.is_none() {
            failure = assess(scenario, &metrics).err();
        }
        let passed = failure.is_none();

        let mut export = world.take_export();
        if let Some(export) = &mut export {
            export.finalize(passed, world.match_step().stats());
        }

        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_ticks: ticks,
            final_time_secs: world.context.time_secs(),
            failure_reason: failure,
            metrics,
        };
        (result, export)
    }

    fn sim_config(
        &self,
        budget: u64,
        policies: (PolicyKind, PolicyKind),
        formations: (&str, &str),
        difficulty: f64,
    ) -> SimConfig {
        SimConfig {
            seed: self.seed,
            team1_policy: policies.0,
            team2_policy: policies.1,
            formation1: formations.0.to_string(),
            formation2: formations.1.to_string(),
            difficulty,
            max_ticks: budget,
            tick_rate_hz: self.tick_rate_hz,
            match_config: self.match_config.clone(),
        }
    }

    fn prepare(&self, scenario: ScenarioId, budget: u64) -> Result<SimWorld, SimError> {
        let scripted = (PolicyKind::Scripted, PolicyKind::Scripted);
        match scenario {
            ScenarioId::Kickoff => SimWorld::new(self.sim_config(budget, scripted, ("default", "default"), 0.6)),
            ScenarioId::Scrimmage => SimWorld::new(self.sim_config(budget, scripted, ("default", "diamond"), 1.0)),
            ScenarioId::Pileup => self.prepare_pileup(budget),
            ScenarioId::FormationDrill => self.prepare_formation_drill(budget),
            ScenarioId::Breakaway => self.prepare_breakaway(budget),
        }
    }

    /// KO-003: every agent within 20 px of the centre spot, nobody acting.
    fn prepare_pileup(&self, budget: u64) -> Result<SimWorld, SimError> {
        let config = self.sim_config(budget, (PolicyKind::Idle, PolicyKind::Idle), ("default", "default"), 0.0);
        let context = SimContext::new(config.seed).with_tick_rate(config.tick_rate_hz);
        let mc = &config.match_config;
        let mut jitter = ChaCha8Rng::seed_from_u64(context.jitter_seed());
        let mut setup = context.setup_rng();

        let mut squad = |side: Side| {
            let players = (0..mc.squad_size)
                .map(|id| {
                    let offset = Vector2::new(setup.gen_range(-14.0..14.0), setup.gen_range(-14.0..14.0));
                    Agent::new(id, side, mc.center() + offset, draw_jitter(&mut jitter))
                })
                .collect();
            Team::from_agents(side, players, Formation::standard(), mc)
        };
        let team1 = squad(Side::One)?;
        let team2 = squad(Side::Two)?;

        let match_step =
            MatchStep::with_teams(mc.clone(), team1, team2, Box::new(IdlePolicy), Box::new(IdlePolicy))?;
        Ok(SimWorld::from_match(config, context, match_step))
    }

    /// KO-004: diamond squads knocked 30-60 px off their slots. Chasers never
    /// act, so everyone else walks home. The ball is parked on the top line
    /// out of everybody's reach.
    fn prepare_formation_drill(&self, budget: u64) -> Result<SimWorld, SimError> {
        let config = self.sim_config(budget, (PolicyKind::Scripted, PolicyKind::Scripted), ("diamond", "diamond"), 0.0);
        let context = SimContext::new(config.seed).with_tick_rate(config.tick_rate_hz);
        let mc = &config.match_config;
        let mut jitter = ChaCha8Rng::seed_from_u64(context.jitter_seed());
        let mut setup = context.setup_rng();

        let mut team1 = Team::new(Side::One, Formation::diamond(), mc, &mut jitter)?;
        let mut team2 = Team::new(Side::Two, Formation::diamond(), mc, &mut jitter)?;
        for player in team1.players.iter_mut().chain(team2.players.iter_mut()) {
            let angle = setup.gen_range(0.0..TAU);
            let radius = setup.gen_range(30.0..60.0);
            player.position += Vector2::new(angle.cos(), angle.sin()) * radius;
            player.clamp_to_field(mc);
        }

        let policy1 = ScriptedPolicy::new(Formation::diamond(), mc.clone(), 0.0, context.policy_rng(Side::One));
        let policy2 = ScriptedPolicy::new(Formation::diamond(), mc.clone(), 0.0, context.policy_rng(Side::Two));
        let mut match_step = MatchStep::with_teams(mc.clone(), team1, team2, Box::new(policy1), Box::new(policy2))?;
        match_step.place_ball(Vector2::new(mc.field_width / 2.0, 2.0 * mc.ball_radius), None)?;

        Ok(SimWorld::from_match(config, context, match_step))
    }

    /// KO-005: team 1's forward carries the ball in the opponent half while
    /// the idle defence stands in a column deep in team 1's half.
    fn prepare_breakaway(&self, budget: u64) -> Result<SimWorld, SimError> {
        let config = self.sim_config(budget, (PolicyKind::Scripted, PolicyKind::Idle), ("default", "default"), 1.0);
        let context = SimContext::new(config.seed).with_tick_rate(config.tick_rate_hz);
        let mc = &config.match_config;
        let mut jitter = ChaCha8Rng::seed_from_u64(context.jitter_seed());

        let mut team1 = Team::new(Side::One, Formation::standard(), mc, &mut jitter)?;
        let striker = team1
            .players
            .last_mut()
            .ok_or_else(|| MatchError::team("empty squad"))?;
        striker.position = Vector2::new(300.0, mc.field_height / 2.0);
        let owner = (Side::One, striker.id);
        let ball_at = Ball::carry_position(striker.position, striker.facing, mc);

        let column_x = mc.field_width - 144.0;
        let spacing = mc.field_height / (mc.squad_size + 1) as f64;
        let defenders = (0..mc.squad_size)
            .map(|id| {
                let position = Vector2::new(column_x, spacing * (id + 1) as f64);
                Agent::new(id, Side::Two, position, draw_jitter(&mut jitter))
            })
            .collect();
        let team2 = Team::from_agents(Side::Two, defenders, Formation::standard(), mc)?;

        let policy1 = ScriptedPolicy::new(Formation::standard(), mc.clone(), 1.0, context.policy_rng(Side::One));
        let mut match_step =
            MatchStep::with_teams(mc.clone(), team1, team2, Box::new(policy1), Box::new(IdlePolicy))?;
        match_step.place_ball(ball_at, Some(owner))?;

        Ok(SimWorld::from_match(config, context, match_step))
    }
}

/// Scenario-specific success criteria, applied after a clean run.
fn assess(scenario: ScenarioId, metrics: &ScenarioMetrics) -> Result<(), String> {
    match scenario {
        ScenarioId::Kickoff => {
            if metrics.claims == 0 {
                return Err("nobody claimed the ball".to_string());
            }
        }
        ScenarioId::Scrimmage => {}
        ScenarioId::Pileup => {
            let (start, end) = metrics.spread;
            if end <= start {
                return Err(format!("pile did not spread ({:.1} px -> {:.1} px)", start, end));
            }
        }
        ScenarioId::FormationDrill => {
            let (start, end) = metrics.formation_error;
            if end >= start / 2.0 {
                return Err(format!("formation error only went from {:.1} px to {:.1} px", start, end));
            }
        }
        ScenarioId::Breakaway => {
            if metrics.goals[0] == 0 {
                return Err("striker did not score".to_string());
            }
            if metrics.shots[0].succ == 0 {
                return Err("goal was not credited as a successful shot".to_string());
            }
        }
    }
    Ok(())
}

/// Bounding box width plus height over every agent.
fn spread(state: &MatchState) -> f64 {
    let mut players = state.all_players();
    let Some(first) = players.next() else {
        return 0.0;
    };

    let (min, max) = players.fold((first.position, first.position), |(min, max), p| {
        (min.inf(&p.position), max.sup(&p.position))
    });
    (max.x - min.x) + (max.y - min.y)
}

/// Mean distance of agents to their formation slots.
fn formation_error(match_step: &MatchStep) -> f64 {
    let config = match_step.config();
    let mut total = 0.0;
    let mut count = 0usize;

    for side in Side::BOTH {
        let team = match_step.team(side);
        for (idx, agent) in team.players.iter().enumerate() {
            if let Some(home) = team.formation.home_position(idx, team.direction(), config) {
                total += distance(&agent.position, &home);
                count += 1;
            }
        }
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kickoff_scenario() {
        let result = ScenarioRunner::new(42).run(ScenarioId::Kickoff);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.claims > 0);
        assert_eq!(result.total_ticks, 900);
        assert_eq!(result.final_time_secs, 30.0);
    }

    #[test]
    fn test_scrimmage_keeps_invariants() {
        for seed in [1, 2, 3] {
            let result = ScenarioRunner::new(seed).with_ticks(600).run(ScenarioId::Scrimmage);
            assert!(result.passed, "seed {}: {:?}", seed, result.failure_reason);
            assert_eq!(result.total_ticks, 600);
        }
    }

    #[test]
    fn test_pileup_spreads_out() {
        let result = ScenarioRunner::new(42).run(ScenarioId::Pileup);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.spread.0 <= 56.0);
        assert!(result.metrics.spread.1 > result.metrics.spread.0);
    }

    #[test]
    fn test_formation_drill_returns_home() {
        let result = ScenarioRunner::new(42).run(ScenarioId::FormationDrill);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.formation_error.0 >= 30.0);
        assert_eq!(result.metrics.claims, 0);
    }

    #[test]
    fn test_breakaway_scores() {
        let result = ScenarioRunner::new(42).run(ScenarioId::Breakaway);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.goals[0] >= 1);
        assert!(result.metrics.shots[0].succ >= 1);
        assert!(result.metrics.kicks >= 1);
    }

    #[test]
    fn test_scrimmage_deterministic() {
        // Same seed should give the same match
        let a = ScenarioRunner::new(7).with_ticks(300).run(ScenarioId::Scrimmage);
        let b = ScenarioRunner::new(7).with_ticks(300).run(ScenarioId::Scrimmage);

        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.total_ticks, b.total_ticks);
    }

    #[test]
    fn test_export_has_a_frame_per_tick() {
        let (result, export) = ScenarioRunner::new(5).run_with_export(ScenarioId::Pileup);
        let export = export.unwrap();

        assert_eq!(export.frames.len() as u64, result.total_ticks);
        assert_eq!(export.passed, result.passed);
        assert_eq!(export.scenario, "pileup");
    }

    #[test]
    fn test_setup_error_fails_the_run() {
        let config = MatchConfig { squad_size: 9, ..Default::default() };
        let result = ScenarioRunner::new(1).with_config(config).run(ScenarioId::Kickoff);

        assert!(!result.passed);
        assert_eq!(result.total_ticks, 0);
        assert!(result.failure_reason.unwrap().starts_with("setup failed"));
    }
}
