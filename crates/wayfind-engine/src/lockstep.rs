//! Lockstep (synchronous) environment driver.
//!
//! [`LockstepEnv`] pairs an [`EpisodeOrchestrator`] with a [`Trainer`]
//! and runs the fixed-timestep action/observation cycle. Each call to
//! [`step()`](LockstepEnv::step) runs exactly one tick:
//!
//! 1. complete a deferred reset, if one is pending;
//! 2. ask the trainer for an action for every active agent;
//! 3. drive the travelling agent, if any;
//! 4. integrate physics and dispatch its contacts in delivery order;
//! 5. run the stuck and timeout checks;
//! 6. forward finished episodes to the trainer.
//!
//! Everything happens on the caller's thread; nothing suspends across
//! ticks.

use log::trace;
use wayfind_core::{
    ConfigError, EpisodeSummary, Observation, Physics, Pose, SpawnSampler, TickId, Trainer,
};
use wayfind_rooms::Room;

use crate::agent::TurnPhase;
use crate::config::EnvConfig;
use crate::metrics::EpisodeMetrics;
use crate::orchestrator::EpisodeOrchestrator;

// ── StepResult ──────────────────────────────────────────────────

/// Result of one [`LockstepEnv::step()`] call.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// The tick that just completed.
    pub tick: TickId,
    /// Observations shown this tick: one per active agent, plus the
    /// neutral observation of a travelling agent.
    pub observations: Vec<Observation>,
    /// Episodes that ended during this tick.
    pub ended: Vec<EpisodeSummary>,
    /// Cumulative counters after this tick.
    pub metrics: EpisodeMetrics,
}

// ── LockstepEnv ─────────────────────────────────────────────────

/// Single-threaded exploration environment driven one tick at a time.
///
/// # Example
///
/// ```ignore
/// let mut env = LockstepEnv::new(config, rooms, homes, physics, sampler, trainer)?;
/// for _ in 0..10_000 {
///     let result = env.step();
///     for summary in &result.ended {
///         println!("{}: {}", summary.episode, summary.group_return);
///     }
/// }
/// ```
pub struct LockstepEnv {
    orchestrator: EpisodeOrchestrator,
    trainer: Box<dyn Trainer>,
    tick: TickId,
}

impl LockstepEnv {
    /// Build the environment and start the first episode.
    pub fn new(
        config: EnvConfig,
        rooms: Vec<Room>,
        homes: Vec<Pose>,
        physics: Box<dyn Physics>,
        sampler: Box<dyn SpawnSampler>,
        trainer: Box<dyn Trainer>,
    ) -> Result<Self, ConfigError> {
        let mut orchestrator = EpisodeOrchestrator::new(config, rooms, homes, physics, sampler)?;
        orchestrator.reset();
        Ok(Self {
            orchestrator,
            trainer,
            tick: TickId(0),
        })
    }

    /// Run one tick.
    pub fn step(&mut self) -> StepResult {
        let dt = self.orchestrator.config().dt;
        self.orchestrator.begin_tick();

        let ids: Vec<_> = self.orchestrator.agent_ids().collect();
        let mut observations = Vec::with_capacity(ids.len());
        for id in ids {
            match self.orchestrator.turn_phase(id) {
                Some(TurnPhase::Active) => {
                    if let Some(obs) = self.orchestrator.observe(id) {
                        let action = self.trainer.act(id, &obs);
                        self.orchestrator.apply_action(id, action);
                        observations.push(obs);
                    }
                }
                Some(TurnPhase::Traveling { .. }) => {
                    if let Some(obs) = self.orchestrator.observe(id) {
                        observations.push(obs);
                    }
                }
                Some(TurnPhase::Inactive) | None => {}
            }
        }

        self.orchestrator.tick_travel();
        let contacts = self.orchestrator.advance_physics(dt);
        self.orchestrator.dispatch_all(contacts);
        self.orchestrator.end_tick(dt);

        let ended = self.orchestrator.drain_completed();
        for summary in &ended {
            self.trainer.end_group_episode(summary);
        }

        self.tick = TickId(self.tick.0 + 1);
        trace!("tick {} done, {} episodes ended", self.tick, ended.len());
        StepResult {
            tick: self.tick,
            observations,
            ended,
            metrics: self.orchestrator.metrics().clone(),
        }
    }

    /// Step until `episodes` episodes have ended or `max_ticks` ticks
    /// have run. Returns the summaries in completion order.
    pub fn run_episodes(&mut self, episodes: usize, max_ticks: u64) -> Vec<EpisodeSummary> {
        let mut done = Vec::new();
        for _ in 0..max_ticks {
            done.extend(self.step().ended);
            if done.len() >= episodes {
                break;
            }
        }
        done
    }

    /// Start a new episode without reporting the current one.
    pub fn reset(&mut self) {
        self.orchestrator.reset();
    }

    /// Reseed the environment stream and start a new episode.
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.orchestrator.reset_with_seed(seed);
    }

    /// The last completed tick.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// The episode state machine.
    pub fn orchestrator(&self) -> &EpisodeOrchestrator {
        &self.orchestrator
    }

    /// Mutable access, for injecting notifications between ticks.
    pub fn orchestrator_mut(&mut self) -> &mut EpisodeOrchestrator {
        &mut self.orchestrator
    }
}

impl std::fmt::Debug for LockstepEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockstepEnv")
            .field("tick", &self.tick)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}
