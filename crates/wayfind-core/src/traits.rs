//! Collaborator traits: the narrow interfaces the episode core needs
//! from physics, spawn sampling and the trainer.
//!
//! None of these are implemented in the core crates except
//! [`SpawnSampler`], which has a uniform reference implementation in
//! `wayfind-rooms`. Physics and training live outside.

use crate::action::{Action, Observation};
use crate::episode::EpisodeSummary;
use crate::error::SampleError;
use crate::event::{CollisionMode, ContactBatch};
use crate::geometry::{Bounds, Pose, Vec3};
use crate::id::{AgentId, RoomId};

/// The physics/motion collaborator.
///
/// Owns every agent's body, the room geometry and the target object.
/// The core drives it through these calls and never reads continuous
/// state beyond [`pose`](Physics::pose) and [`is_free`](Physics::is_free).
pub trait Physics {
    /// Current pose of an agent's body.
    fn pose(&self, agent: AgentId) -> Pose;

    /// Teleport an agent's body to `pose`.
    fn set_pose(&mut self, agent: AgentId, pose: Pose);

    /// Zero an agent's linear and angular velocity.
    fn stop(&mut self, agent: AgentId);

    /// Drive an agent with a trainer action for the coming step.
    fn apply_action(&mut self, agent: AgentId, action: &Action);

    /// Steer an agent one step along a path toward `target`.
    fn follow_waypoint(&mut self, agent: AgentId, target: Vec3);

    /// Switch an agent's collision representation.
    fn set_collision_mode(&mut self, agent: AgentId, mode: CollisionMode);

    /// Whether a sphere of `radius` at `point` touches no obstacle.
    fn is_free(&self, point: Vec3, radius: f32) -> bool;

    /// Rotate a room's geometry about its center.
    fn set_room_yaw(&mut self, room: RoomId, yaw_degrees: f32);

    /// Move the target object.
    fn set_target(&mut self, position: Vec3);

    /// Integrate one fixed step of `dt` seconds and return the contacts
    /// generated during it, in delivery order.
    fn advance(&mut self, dt: f64) -> ContactBatch;
}

/// Finds an unobstructed point inside a region.
///
/// Implementations must give up after `max_attempts` draws; the caller
/// falls back to a deterministic safe point rather than looping.
pub trait SpawnSampler {
    /// Draw candidate points in `bounds` until `is_free` accepts one.
    ///
    /// Points lie on the horizontal plane through the center of `bounds`;
    /// the caller lifts them to the spawn height.
    fn sample(
        &mut self,
        bounds: &Bounds,
        is_free: &dyn Fn(Vec3) -> bool,
        max_attempts: u32,
    ) -> Result<Vec3, SampleError>;
}

/// The external learner.
///
/// Receives one observation per current agent each tick and answers
/// with an action, and is told once per group episode when it ends.
pub trait Trainer {
    /// Choose an action for `agent`.
    fn act(&mut self, agent: AgentId, obs: &Observation) -> Action;

    /// The group episode ended with the finalized returns in `summary`.
    fn end_group_episode(&mut self, summary: &EpisodeSummary);
}
