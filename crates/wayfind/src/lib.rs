//! Wayfind: episode orchestration for multi-agent room exploration.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Wayfind sub-crates. Physics and the learner stay outside; plug them
//! in through the [`Physics`](prelude::Physics) and
//! [`Trainer`](prelude::Trainer) traits.
//!
//! # Quick start
//!
//! ```rust
//! use wayfind::prelude::*;
//! use wayfind_test_utils::{homes, line_layout, MockPhysics, ScriptedTrainer};
//!
//! let config = EnvConfig::default().dt(0.5).max_episode_duration(2.0);
//! let mut env = LockstepEnv::new(
//!     config,
//!     line_layout(3),
//!     homes(2),
//!     Box::new(MockPhysics::new()),
//!     Box::new(UniformSpawnSampler::new(42)),
//!     Box::new(ScriptedTrainer::default()),
//! )
//! .unwrap();
//!
//! let done = env.run_episodes(1, 100);
//! assert_eq!(done[0].reason, TerminalReason::Timeout);
//! assert_eq!(done[0].ticks, 5);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `wayfind-core` | IDs, geometry, contact events, collaborator traits |
//! | [`rooms`] | `wayfind-rooms` | Room registry, goal selection, spawn sampling |
//! | [`engine`] | `wayfind-engine` | Episode orchestrator, turn scheduler, lockstep driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`wayfind-core`).
pub use wayfind_core as types;

/// Rooms and the goal room (`wayfind-rooms`).
///
/// [`rooms::RoomRegistry`] tracks visitation; [`rooms::GoalSelection`]
/// decides how the goal room is drawn each episode.
pub use wayfind_rooms as rooms;

/// Episode orchestration (`wayfind-engine`).
///
/// [`engine::LockstepEnv`] for tick-by-tick training loops,
/// [`engine::EpisodeOrchestrator`] when the caller owns the loop.
pub use wayfind_engine as engine;

/// Common imports for typical Wayfind usage.
///
/// ```rust
/// use wayfind::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use wayfind_core::{
        Action, AgentId, Bounds, CollisionCategory, CollisionMode, ContactBatch, ContactEvent,
        EpisodeId, EpisodeSummary, Observation, Pose, RoomId, TerminalReason, TickId, Vec3,
        ZoneRef,
    };
    pub use wayfind_core::{Physics, SpawnSampler, Trainer};

    // Errors
    pub use wayfind_core::{ConfigError, RoomError, SampleError, SelectionError};

    // Rooms
    pub use wayfind_rooms::{
        GoalSelection, Room, RoomRegistry, TargetPlacement, UniformSpawnSampler,
    };

    // Engine
    pub use wayfind_engine::{
        DiscoveryGroupReward, EnvConfig, EpisodeMetrics, EpisodeOrchestrator, LockstepEnv,
        RewardConfig, SpawnConfig, SpawnMode, StepResult, StuckConfig, TurnPolicy,
    };
}
