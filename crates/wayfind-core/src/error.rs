//! Error types for the Wayfind environment, organized by subsystem:
//! configuration (fatal at startup), spawn sampling, goal-room
//! selection, and room lookup.
//!
//! Only [`ConfigError`] ever stops an environment from running. The
//! others are recovered locally by the caller.

use thiserror::Error;

use crate::id::RoomId;

/// Errors detected while validating an environment configuration.
///
/// Reported once at construction; an environment that fails
/// validation never reaches the `Active` state.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The layout contains no rooms.
    #[error("no rooms registered")]
    NoRooms,
    /// The roster contains no agents.
    #[error("no agents registered")]
    NoAgents,
    /// Two rooms share an identifier.
    #[error("duplicate room id {0}")]
    DuplicateRoom(RoomId),
    /// Random spawning was requested without an area to sample from.
    #[error("spawn area bounds are required for random spawning")]
    MissingAreaBounds,
    /// The spawn area is malformed.
    #[error("invalid area bounds: {reason}")]
    InvalidBounds {
        /// Description of the problem.
        reason: String,
    },
    /// A numeric parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending field.
        name: &'static str,
        /// Description of the problem.
        reason: String,
    },
}

/// Spawn sampling ran out of attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SampleError {
    /// No unobstructed point was found.
    #[error("no free point found after {attempts} attempts")]
    Exhausted {
        /// Number of samples drawn.
        attempts: u32,
    },
}

/// Goal-room selection could not pick a room.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SelectionError {
    /// The registry is empty.
    #[error("no rooms to select from")]
    NoRooms,
    /// No room lies within the selection radius.
    #[error("no room within radius {radius}")]
    EmptyCandidateSet {
        /// The radius that was searched.
        radius: f32,
    },
}

/// A room lookup failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RoomError {
    /// No room with this identifier is registered.
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(ConfigError::NoRooms.to_string(), "no rooms registered");
        assert_eq!(
            ConfigError::InvalidParameter {
                name: "dt",
                reason: "must be positive".into()
            }
            .to_string(),
            "invalid parameter `dt`: must be positive"
        );
        assert_eq!(
            SampleError::Exhausted { attempts: 100 }.to_string(),
            "no free point found after 100 attempts"
        );
        assert_eq!(
            RoomError::UnknownRoom(RoomId(7)).to_string(),
            "unknown room 7"
        );
    }
}
