//! Per-agent episode state.
//!
//! Physical motion lives in the physics collaborator. This is the
//! exploration bookkeeping the orchestrator needs: which room the agent
//! is in, what it has found, and where it stands in the turn rotation.

use wayfind_core::{AgentId, Observation, Pose, RoomId, Vec3};

/// Where an agent stands in the turn rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnPhase {
    /// Parked; receives no actions.
    Inactive,
    /// Driven toward the predecessor's stop pose; actions are ignored.
    Traveling {
        /// Pose to snap to on arrival.
        target: Pose,
    },
    /// Receiving actions.
    Active,
}

/// Exploration state of one agent for the current episode.
#[derive(Clone, Debug)]
pub struct AgentState {
    id: AgentId,
    home: Pose,
    spawn: Pose,
    phase: TurnPhase,
    /// Whether the agent is inside a room trigger.
    pub in_room: bool,
    /// The room the agent is in, if any.
    pub current_room: Option<RoomId>,
    /// Whether this agent entered the goal room this episode.
    pub goal_room_found: bool,
    /// Whether the current room was already visited when entered.
    pub revisiting: bool,
    /// Non-goal rooms this agent discovered since its last hand-off.
    pub explored_new_rooms: u32,
    /// Whether this agent's report ended the episode and the deferred
    /// reset has not run yet. Never set when the reset is immediate; the
    /// reporting agent is recorded in the episode summary either way.
    pub terminal_fired: bool,
    progress_anchor: Vec3,
    stalled_secs: f64,
}

impl AgentState {
    /// A parked agent with the given home pose.
    pub fn new(id: AgentId, home: Pose) -> Self {
        Self {
            id,
            home,
            spawn: home,
            phase: TurnPhase::Inactive,
            in_room: false,
            current_room: None,
            goal_room_found: false,
            revisiting: false,
            explored_new_rooms: 0,
            terminal_fired: false,
            progress_anchor: home.position,
            stalled_secs: 0.0,
        }
    }

    /// Roster identity.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Registered home pose.
    pub fn home(&self) -> Pose {
        self.home
    }

    /// Where the agent spawned this episode.
    pub fn spawn(&self) -> Pose {
        self.spawn
    }

    /// Current turn phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Whether the agent receives actions.
    pub fn is_active(&self) -> bool {
        self.phase == TurnPhase::Active
    }

    /// Whether the agent is in its hand-off travel phase.
    pub fn is_traveling(&self) -> bool {
        matches!(self.phase, TurnPhase::Traveling { .. })
    }

    /// Clear every exploration flag and park the agent at `spawn`.
    pub fn reset_episode(&mut self, spawn: Pose) {
        self.spawn = spawn;
        self.phase = TurnPhase::Inactive;
        self.in_room = false;
        self.current_room = None;
        self.goal_room_found = false;
        self.revisiting = false;
        self.explored_new_rooms = 0;
        self.terminal_fired = false;
        self.progress_anchor = spawn.position;
        self.stalled_secs = 0.0;
    }

    pub(crate) fn activate(&mut self, position: Vec3) {
        self.phase = TurnPhase::Active;
        self.progress_anchor = position;
        self.stalled_secs = 0.0;
    }

    pub(crate) fn begin_travel(&mut self, target: Pose) {
        self.phase = TurnPhase::Traveling { target };
    }

    pub(crate) fn deactivate(&mut self) {
        self.phase = TurnPhase::Inactive;
    }

    /// Record entering `room`.
    pub fn enter_room(&mut self, room: RoomId) {
        self.in_room = true;
        self.current_room = Some(room);
    }

    /// Record leaving the current room.
    pub fn exit_room(&mut self) {
        self.in_room = false;
        self.revisiting = false;
        self.current_room = None;
    }

    /// Feed the stuck detector one tick of motion.
    ///
    /// Moving at least `min_progress` away from the last anchor restarts
    /// the clock. Returns the seconds spent without progress.
    pub fn track_progress(&mut self, position: Vec3, dt: f64, min_progress: f32) -> f64 {
        if position.distance(self.progress_anchor) >= min_progress {
            self.progress_anchor = position;
            self.stalled_secs = 0.0;
        } else {
            self.stalled_secs += dt;
        }
        self.stalled_secs
    }

    /// The exploration observation tuple. Travelling agents report the
    /// neutral tuple.
    pub fn observe(&self, distance_to_target: f32) -> Observation {
        if self.is_traveling() {
            return Observation {
                traveling: true,
                ..Observation::neutral(self.id)
            };
        }
        Observation {
            agent: self.id,
            traveling: false,
            goal_room_found: self.goal_room_found,
            in_room: self.in_room,
            revisiting: self.revisiting,
            explored_rooms: self.explored_new_rooms,
            distance_to_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> AgentState {
        AgentState::new(AgentId(0), Pose::new(Vec3::new(1.0, 0.0, 1.0), 90.0))
    }

    #[test]
    fn reset_clears_every_flag() {
        let mut a = agent();
        a.enter_room(RoomId(2));
        a.goal_room_found = true;
        a.revisiting = true;
        a.explored_new_rooms = 4;
        a.terminal_fired = true;
        a.activate(Vec3::ZERO);

        let spawn = Pose::new(Vec3::new(5.0, 1.0, 5.0), 0.0);
        a.reset_episode(spawn);
        assert!(!a.in_room);
        assert_eq!(a.current_room, None);
        assert!(!a.goal_room_found);
        assert!(!a.revisiting);
        assert_eq!(a.explored_new_rooms, 0);
        assert!(!a.terminal_fired);
        assert_eq!(a.phase(), TurnPhase::Inactive);
        assert_eq!(a.spawn(), spawn);
        assert_eq!(a.home().yaw_degrees, 90.0);
    }

    #[test]
    fn exit_clears_room_and_revisit() {
        let mut a = agent();
        a.enter_room(RoomId(1));
        a.revisiting = true;
        a.exit_room();
        assert!(!a.in_room);
        assert!(!a.revisiting);
        assert_eq!(a.current_room, None);
    }

    #[test]
    fn travelling_agent_observes_neutral_tuple() {
        let mut a = agent();
        a.goal_room_found = true;
        a.explored_new_rooms = 3;
        a.begin_travel(Pose::default());
        let obs = a.observe(7.0);
        assert!(obs.traveling);
        assert!(obs.to_vec().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn active_agent_observes_flags() {
        let mut a = agent();
        a.activate(Vec3::ZERO);
        a.enter_room(RoomId(1));
        a.explored_new_rooms = 2;
        let obs = a.observe(4.0);
        assert!(!obs.traveling);
        assert!(obs.in_room);
        assert_eq!(obs.explored_rooms, 2);
        assert_eq!(obs.distance_to_target, 4.0);
    }

    #[test]
    fn stalled_time_accumulates_until_progress() {
        let mut a = agent();
        a.activate(Vec3::ZERO);
        assert_eq!(a.track_progress(Vec3::ZERO, 0.5, 0.1), 0.5);
        assert_eq!(a.track_progress(Vec3::new(0.05, 0.0, 0.0), 0.5, 0.1), 1.0);
        assert_eq!(a.track_progress(Vec3::new(0.2, 0.0, 0.0), 0.5, 0.1), 0.0);
    }
}
