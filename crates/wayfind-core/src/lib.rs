//! Core types and traits for the Wayfind exploration environment.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Wayfind workspace:
//! typed IDs, geometry, contact events, actions and observations,
//! episode summaries, error types, and the collaborator traits the
//! episode core talks to (physics, spawn sampling, trainer).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod episode;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod traits;

pub use action::{Action, Observation};
pub use episode::{EpisodeSummary, TerminalReason};
pub use error::{ConfigError, RoomError, SampleError, SelectionError};
pub use event::{CollisionCategory, CollisionMode, ContactBatch, ContactEvent, ZoneRef};
pub use geometry::{Bounds, Pose, Vec3};
pub use id::{AgentId, EpisodeId, RoomId, TickId};
pub use traits::{Physics, SpawnSampler, Trainer};
