//! Per-agent action and exploration observation.

use crate::id::AgentId;

/// Continuous two-channel action produced by the trainer.
///
/// `move_signal` drives the agent forward, `rotate_signal` turns it about
/// the vertical axis. Use [`clamped`](Action::clamped) before handing the
/// action to physics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    /// Forward throttle, meaningful range `[0, 1]`.
    pub move_signal: f32,
    /// Turn rate, meaningful range `[-1, 1]`.
    pub rotate_signal: f32,
}

impl Action {
    /// The do-nothing action.
    pub const IDLE: Action = Action {
        move_signal: 0.0,
        rotate_signal: 0.0,
    };

    /// Construct an action.
    pub const fn new(move_signal: f32, rotate_signal: f32) -> Self {
        Self {
            move_signal,
            rotate_signal,
        }
    }

    /// Clamp both channels into their valid ranges. NaN becomes zero.
    pub fn clamped(self) -> Self {
        let clean = |v: f32| if v.is_nan() { 0.0 } else { v };
        Self {
            move_signal: clean(self.move_signal).clamp(0.0, 1.0),
            rotate_signal: clean(self.rotate_signal).clamp(-1.0, 1.0),
        }
    }
}

/// Exploration part of an agent's observation tuple.
///
/// The sensor encoder owned by the trainer side appends kinematic
/// readings (velocity, angular velocity) to these values. While an
/// agent is travelling to a hand-off point it reports
/// [`neutral`](Observation::neutral).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    /// Agent this observation belongs to.
    pub agent: AgentId,
    /// The agent is in the hand-off travel phase.
    pub traveling: bool,
    /// The agent has entered the goal room this episode.
    pub goal_room_found: bool,
    /// The agent is inside a room's detection zone.
    pub in_room: bool,
    /// The room the agent is in was already visited.
    pub revisiting: bool,
    /// New non-goal rooms discovered during the agent's current turn.
    pub explored_rooms: u32,
    /// Straight-line distance to the target.
    pub distance_to_target: f32,
}

impl Observation {
    /// The all-zero observation.
    pub fn neutral(agent: AgentId) -> Self {
        Self {
            agent,
            traveling: false,
            goal_room_found: false,
            in_room: false,
            revisiting: false,
            explored_rooms: 0,
            distance_to_target: 0.0,
        }
    }

    /// Flatten into the `f32` layout expected by the trainer:
    /// `[goal_room_found, in_room, revisiting, explored_rooms, distance_to_target]`.
    pub fn to_vec(&self) -> Vec<f32> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        vec![
            flag(self.goal_room_found),
            flag(self.in_room),
            flag(self.revisiting),
            self.explored_rooms as f32,
            self.distance_to_target,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_limits_channels() {
        let a = Action::new(2.0, -3.0).clamped();
        assert_eq!(a, Action::new(1.0, -1.0));
        let b = Action::new(-0.5, 0.25).clamped();
        assert_eq!(b, Action::new(0.0, 0.25));
    }

    #[test]
    fn clamped_replaces_nan() {
        let a = Action::new(f32::NAN, f32::NAN).clamped();
        assert_eq!(a, Action::IDLE);
    }

    #[test]
    fn neutral_flattens_to_zeros() {
        let obs = Observation::neutral(AgentId(1));
        assert!(obs.to_vec().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn flags_flatten_in_order() {
        let obs = Observation {
            agent: AgentId(0),
            traveling: false,
            goal_room_found: true,
            in_room: false,
            revisiting: true,
            explored_rooms: 3,
            distance_to_target: 2.5,
        };
        assert_eq!(obs.to_vec(), vec![1.0, 0.0, 1.0, 3.0, 2.5]);
    }
}
