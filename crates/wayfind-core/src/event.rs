//! Discrete contact events reported by the physics collaborator.
//!
//! The physics layer integrates one fixed step and returns every contact
//! generated during it, in delivery order. The episode core consumes
//! them synchronously within the same tick; nothing is registered as a
//! callback.

use smallvec::SmallVec;

use crate::geometry::Vec3;
use crate::id::{AgentId, RoomId};

/// What an agent collided with.
///
/// The collision system reports at most one category per contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionCategory {
    /// The goal object placed inside the goal room.
    Target,
    /// Static geometry.
    Wall,
    /// Another agent's body.
    Agent,
    /// Anything the core does not react to.
    Other,
}

/// A trigger volume an agent can enter or leave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneRef {
    /// The detection zone covering a room's interior.
    Room(RoomId),
    /// The doorway zone of a room (door-gated layouts only).
    Door(RoomId),
}

/// Which collision representation an agent body uses.
///
/// Travelling agents switch to a representation that does not collide
/// with static geometry, and switch back when they arrive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionMode {
    /// Regular body, collides with walls, agents and the target.
    Normal,
    /// Hand-off travel body.
    Travel,
}

/// A single contact generated during one physics step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactEvent {
    /// The agent's body touched something.
    Collision {
        /// Agent whose body made contact.
        agent: AgentId,
        /// What it touched.
        category: CollisionCategory,
        /// World-space contact point.
        contact_point: Vec3,
    },
    /// The agent entered a trigger zone.
    TriggerEnter {
        /// Agent entering the zone.
        agent: AgentId,
        /// Zone entered.
        zone: ZoneRef,
    },
    /// The agent left a trigger zone.
    TriggerExit {
        /// Agent leaving the zone.
        agent: AgentId,
        /// Zone left.
        zone: ZoneRef,
    },
    /// The physics layer decided the agent is stuck.
    Stuck {
        /// The stuck agent.
        agent: AgentId,
    },
}

impl ContactEvent {
    /// The agent this event concerns.
    pub fn agent(&self) -> AgentId {
        match *self {
            Self::Collision { agent, .. }
            | Self::TriggerEnter { agent, .. }
            | Self::TriggerExit { agent, .. }
            | Self::Stuck { agent } => agent,
        }
    }
}

/// Contacts generated during one physics step.
///
/// Most ticks produce zero to a handful of contacts, so the batch stays
/// inline until it spills.
pub type ContactBatch = SmallVec<[ContactEvent; 4]>;
