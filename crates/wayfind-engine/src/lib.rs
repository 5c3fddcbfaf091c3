//! Episode orchestration for the Wayfind exploration environment.
//!
//! Provides [`LockstepEnv`] for tick-by-tick training loops on top of
//! [`EpisodeOrchestrator`], the state machine that selects the active
//! agent, hands control between agents, accumulates rewards in a
//! [`RewardLedger`] and guarantees at most one termination per episode.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod ledger;
pub mod lockstep;
pub mod metrics;
pub mod orchestrator;
pub mod scheduler;

pub use agent::{AgentState, TurnPhase};
pub use config::{
    DiscoveryGroupReward, EnvConfig, RewardConfig, SpawnConfig, SpawnMode, StuckConfig,
    TurnPolicy,
};
pub use ledger::RewardLedger;
pub use lockstep::{LockstepEnv, StepResult};
pub use metrics::EpisodeMetrics;
pub use orchestrator::{EpisodeOrchestrator, EpisodePhase};
pub use scheduler::TurnScheduler;
