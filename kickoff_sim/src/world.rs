//! SimWorld - one seeded match plus its policies, clock and exporter.

use crate::context::{SimContext, DEFAULT_TICK_RATE_HZ};
use crate::error::SimError;
use crate::exporter::{MatchExport, MatchFrame};
use crate::policies::{IdlePolicy, InputHandle, InputPolicy, ScriptedPolicy};
use kickoff_core::{Formation, MatchConfig, MatchStep, Side, TickOutcome};
use kickoff_env::TeamPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which policy drives a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Idle,
    Scripted,

    /// Driven through an [`InputHandle`]
    Input,
}

impl PolicyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Idle => "idle",
            PolicyKind::Scripted => "scripted",
            PolicyKind::Input => "input",
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(PolicyKind::Idle),
            "scripted" | "ai" => Ok(PolicyKind::Scripted),
            "input" | "human" => Ok(PolicyKind::Input),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    pub team1_policy: PolicyKind,
    pub team2_policy: PolicyKind,

    /// Formation template names
    pub formation1: String,
    pub formation2: String,

    /// Scripted policy difficulty in `[0, 1]`
    pub difficulty: f64,

    /// Tick budget for [`SimWorld::run`]
    pub max_ticks: u64,

    /// Virtual frame rate
    pub tick_rate_hz: u32,

    pub match_config: MatchConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            team1_policy: PolicyKind::Scripted,
            team2_policy: PolicyKind::Scripted,
            formation1: "default".to_string(),
            formation2: "default".to_string(),
            difficulty: 0.6,
            max_ticks: 900,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            match_config: MatchConfig::default(),
        }
    }
}

/// The SimWorld - container for one simulated match.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Seed streams and virtual clock
    pub context: SimContext,

    match_step: MatchStep,

    /// Input handles of input-driven teams, by side index
    inputs: [Option<InputHandle>; 2],

    export: Option<MatchExport>,
}

impl SimWorld {
    /// Creates a new SimWorld with the given configuration.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let context = SimContext::new(config.seed).with_tick_rate(config.tick_rate_hz);
        let formation1 = Formation::by_name(&config.formation1)?;
        let formation2 = Formation::by_name(&config.formation2)?;

        let (policy1, input1) = build_policy(config.team1_policy, Side::One, &formation1, &config, &context);
        let (policy2, input2) = build_policy(config.team2_policy, Side::Two, &formation2, &config, &context);

        let match_step = MatchStep::new(
            config.match_config.clone(),
            context.jitter_seed(),
            formation1,
            formation2,
            policy1,
            policy2,
        )?;

        let mut world = Self::from_match(config, context, match_step);
        world.inputs = [input1, input2];
        Ok(world)
    }

    /// Wraps a prepared match (custom placements).
    pub fn from_match(config: SimConfig, context: SimContext, match_step: MatchStep) -> Self {
        Self {
            config,
            context,
            match_step,
            inputs: [None, None],
            export: None,
        }
    }

    /// Starts recording a frame per advanced tick.
    pub fn enable_export(&mut self, scenario: &str) {
        self.export = Some(MatchExport::new(scenario, self.config.seed));
    }

    /// Advances one tick through the policies.
    pub fn step(&mut self) -> Result<TickOutcome, SimError> {
        let outcome = self.match_step.tick()?;

        if let TickOutcome::Advanced(transition) = &outcome {
            self.context.advance_frame();

            if let Some(export) = &mut self.export {
                export.add_frame(MatchFrame {
                    tick: transition.state.tick,
                    time_sec: self.context.time_secs(),
                    state: transition.state.clone(),
                    stats: self.match_step.stats().clone(),
                    events: transition.events.clone(),
                });
            }

            if !transition.events.is_empty() {
                debug!("t={:.2}s events={:?}", self.context.time_secs(), transition.events);
            }
        }

        Ok(outcome)
    }

    /// Runs until `max_ticks` or until the match stops running.
    /// Returns the number of ticks advanced.
    pub fn run(&mut self) -> Result<u64, SimError> {
        let mut advanced = 0;
        while advanced < self.config.max_ticks {
            match self.step()? {
                TickOutcome::Advanced(_) => advanced += 1,
                TickOutcome::Frozen(_) => break,
            }
        }

        let stats = self.match_step.stats();
        info!(
            "Run finished after {} ticks ({:.1}s): {} - {}",
            advanced,
            self.context.time_secs(),
            stats.goals(Side::One),
            stats.goals(Side::Two)
        );
        Ok(advanced)
    }

    pub fn match_step(&self) -> &MatchStep {
        &self.match_step
    }

    /// Lifecycle controls (pause, resume, toggles) go through here.
    pub fn match_step_mut(&mut self) -> &mut MatchStep {
        &mut self.match_step
    }

    /// Input handle of an input-driven team.
    pub fn input(&self, side: Side) -> Option<&InputHandle> {
        self.inputs[side.index()].as_ref()
    }

    pub fn export(&self) -> Option<&MatchExport> {
        self.export.as_ref()
    }

    pub fn take_export(&mut self) -> Option<MatchExport> {
        self.export.take()
    }
}

/// Builds the policy for one side; input-driven policies also return their
/// handle.
pub fn build_policy(
    kind: PolicyKind,
    side: Side,
    formation: &Formation,
    config: &SimConfig,
    context: &SimContext,
) -> (Box<dyn TeamPolicy>, Option<InputHandle>) {
    let rng = context.policy_rng(side);
    match kind {
        PolicyKind::Idle => (Box::new(IdlePolicy), None),
        PolicyKind::Scripted => (
            Box::new(ScriptedPolicy::new(
                formation.clone(),
                config.match_config.clone(),
                config.difficulty,
                rng,
            )),
            None,
        ),
        PolicyKind::Input => {
            let handle = InputHandle::new();
            let policy = InputPolicy::new(handle.clone(), formation.clone(), config.match_config.clone(), rng);
            (Box::new(policy), Some(handle))
        }
    }
}
