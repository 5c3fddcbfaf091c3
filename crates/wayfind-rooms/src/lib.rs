//! Room registry, goal-room selection and spawn sampling for Wayfind.
//!
//! The registry owns every [`Room`] of a layout and the current goal
//! room. It is re-initialized at the start of every episode: rotations
//! are re-rolled, visitation is cleared and a new goal is picked.
//!
//! Entering and leaving rooms is classified here
//! ([`RoomRegistry::enter`], [`RoomRegistry::exit`]); turning the
//! classification into rewards is the episode orchestrator's job.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod registry;
pub mod room;
pub mod selection;
pub mod spawn;
pub mod target;

pub use registry::{GoalPick, RoomEntry, RoomRegistry};
pub use room::Room;
pub use selection::GoalSelection;
pub use spawn::{random_yaw, sample_or_fallback, SpawnPoint, UniformSpawnSampler};
pub use target::TargetPlacement;
