//! A single room of the layout.

use rand::Rng;
use wayfind_core::{RoomId, Vec3};

/// A room: fixed placement, per-episode visitation and rotation.
///
/// Created once when the layout is loaded and never destroyed. Every
/// episode starts with [`initialize`](Room::initialize), which clears
/// visitation and re-rolls the rotation when the room allows it.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    id: RoomId,
    center: Vec3,
    door: Option<Vec3>,
    random_rotation: bool,
    quarter_turns: u8,
    visited: bool,
    door_passed: bool,
}

impl Room {
    /// Create an unrotated, unvisited room without a door.
    pub fn new(id: RoomId, center: Vec3) -> Self {
        Self {
            id,
            center,
            door: None,
            random_rotation: false,
            quarter_turns: 0,
            visited: false,
            door_passed: false,
        }
    }

    /// Give the room a doorway at `position` (door-gated layouts).
    pub fn with_door(mut self, position: Vec3) -> Self {
        self.door = Some(position);
        self
    }

    /// Let [`initialize`](Room::initialize) rotate the room by a random
    /// multiple of 90°.
    pub fn with_random_rotation(mut self, enabled: bool) -> Self {
        self.random_rotation = enabled;
        self
    }

    /// The room's identifier.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// World-space center.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Doorway position, if the room has one.
    pub fn door(&self) -> Option<Vec3> {
        self.door
    }

    /// Whether the room re-rolls its rotation each episode.
    pub fn has_random_rotation(&self) -> bool {
        self.random_rotation
    }

    /// Current rotation about the vertical axis, in degrees.
    pub fn yaw_degrees(&self) -> f32 {
        f32::from(self.quarter_turns) * 90.0
    }

    /// Whether an agent already discovered this room this episode.
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Whether an agent already walked through this room's door this episode.
    pub fn door_passed(&self) -> bool {
        self.door_passed
    }

    /// Start a new episode: clear visitation and re-roll rotation.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.random_rotation {
            self.quarter_turns = rng.random_range(0..4u8);
        }
        self.visited = false;
        self.door_passed = false;
    }

    /// Mark the room as visited.
    ///
    /// Returns `true` only on the call that flips the flag; later calls
    /// in the same episode change nothing.
    pub fn mark_visited(&mut self) -> bool {
        if self.visited {
            return false;
        }
        self.visited = true;
        true
    }

    /// Record that an agent passed the door. Returns `true` the first time.
    pub fn pass_door(&mut self) -> bool {
        if self.door_passed {
            return false;
        }
        self.door_passed = true;
        true
    }
}
