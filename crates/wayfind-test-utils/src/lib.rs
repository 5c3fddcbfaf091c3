//! Test utilities and mock collaborators for Wayfind development.
//!
//! Provides mock implementations of the collaborator traits
//! ([`Physics`], [`SpawnSampler`], [`Trainer`]) plus layout fixtures.
//! Every mock is a cheap handle over shared state: keep a clone in the
//! test, hand the other to the code under test, and inspect or script
//! it between ticks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use wayfind_core::{
    Action, AgentId, Bounds, CollisionMode, ContactBatch, ContactEvent, EpisodeSummary,
    Observation, Physics, Pose, RoomId, SampleError, SpawnSampler, Trainer, Vec3,
};

pub use fixtures::{four_room_layout, homes, line_layout};

// ── MockPhysics ────────────────────────────────────────────────────

/// Everything [`MockPhysics`] records or is scripted with.
#[derive(Debug)]
pub struct PhysicsState {
    pub poses: HashMap<AgentId, Pose>,
    pub pending: Vec<ContactEvent>,
    pub collision_modes: Vec<(AgentId, CollisionMode)>,
    pub stops: Vec<AgentId>,
    pub actions: Vec<(AgentId, Action)>,
    pub waypoints: Vec<(AgentId, Vec3)>,
    pub room_yaws: Vec<(RoomId, f32)>,
    pub target: Option<Vec3>,
    pub obstacles: Vec<(Vec3, f32)>,
    pub all_blocked: bool,
    /// Distance covered per `follow_waypoint` call.
    pub travel_step: f32,
    /// Distance covered per unit of `move_signal`.
    pub action_step: f32,
    pub advances: u64,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            poses: HashMap::new(),
            pending: Vec::new(),
            collision_modes: Vec::new(),
            stops: Vec::new(),
            actions: Vec::new(),
            waypoints: Vec::new(),
            room_yaws: Vec::new(),
            target: None,
            obstacles: Vec::new(),
            all_blocked: false,
            travel_step: 1.0,
            action_step: 0.0,
            advances: 0,
        }
    }
}

/// Kinematic stand-in for the physics collaborator.
///
/// Agents teleport, waypoints are followed in straight fixed-length
/// steps, and contacts are whatever the test queued with
/// [`queue`](MockPhysics::queue); they are delivered by the next
/// `advance` call in queue order.
#[derive(Clone, Default)]
pub struct MockPhysics {
    state: Rc<RefCell<PhysicsState>>,
}

impl MockPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, PhysicsState> {
        self.state.borrow()
    }

    /// Put an agent somewhere without recording anything.
    pub fn place(&self, agent: AgentId, pose: Pose) {
        self.state.borrow_mut().poses.insert(agent, pose);
    }

    pub fn move_to(&self, agent: AgentId, position: Vec3) {
        let mut s = self.state.borrow_mut();
        let yaw = s.poses.get(&agent).map_or(0.0, |p| p.yaw_degrees);
        s.poses.insert(agent, Pose::new(position, yaw));
    }

    pub fn pose_of(&self, agent: AgentId) -> Pose {
        self.state.borrow().poses.get(&agent).copied().unwrap_or_default()
    }

    /// Deliver `event` on the next `advance`.
    pub fn queue(&self, event: ContactEvent) {
        self.state.borrow_mut().pending.push(event);
    }

    pub fn block(&self, center: Vec3, radius: f32) {
        self.state.borrow_mut().obstacles.push((center, radius));
    }

    /// Make every `is_free` query fail.
    pub fn block_everything(&self) {
        self.state.borrow_mut().all_blocked = true;
    }

    pub fn set_travel_step(&self, step: f32) {
        self.state.borrow_mut().travel_step = step;
    }

    pub fn set_action_step(&self, step: f32) {
        self.state.borrow_mut().action_step = step;
    }

    pub fn last_collision_mode(&self, agent: AgentId) -> Option<CollisionMode> {
        self.state
            .borrow()
            .collision_modes
            .iter()
            .rev()
            .find(|(a, _)| *a == agent)
            .map(|(_, m)| *m)
    }

    pub fn stops(&self) -> Vec<AgentId> {
        self.state.borrow().stops.clone()
    }

    pub fn actions_for(&self, agent: AgentId) -> Vec<Action> {
        self.state
            .borrow()
            .actions
            .iter()
            .filter(|(a, _)| *a == agent)
            .map(|(_, act)| *act)
            .collect()
    }

    pub fn target(&self) -> Option<Vec3> {
        self.state.borrow().target
    }

    pub fn room_yaws(&self) -> Vec<(RoomId, f32)> {
        self.state.borrow().room_yaws.clone()
    }
}

impl Physics for MockPhysics {
    fn pose(&self, agent: AgentId) -> Pose {
        self.pose_of(agent)
    }

    fn set_pose(&mut self, agent: AgentId, pose: Pose) {
        self.place(agent, pose);
    }

    fn stop(&mut self, agent: AgentId) {
        self.state.borrow_mut().stops.push(agent);
    }

    fn apply_action(&mut self, agent: AgentId, action: &Action) {
        let mut s = self.state.borrow_mut();
        s.actions.push((agent, *action));
        let step = s.action_step * action.move_signal;
        if step != 0.0 {
            let pose = s.poses.get(&agent).copied().unwrap_or_default();
            let yaw = pose.yaw_degrees.to_radians();
            let delta = Vec3::new(yaw.sin() * step, 0.0, yaw.cos() * step);
            s.poses.insert(agent, Pose::new(pose.position + delta, pose.yaw_degrees));
        }
    }

    fn follow_waypoint(&mut self, agent: AgentId, target: Vec3) {
        let mut s = self.state.borrow_mut();
        s.waypoints.push((agent, target));
        let step = s.travel_step;
        let pose = s.poses.get(&agent).copied().unwrap_or_default();
        let to_go = target - pose.position;
        let dist = to_go.length();
        let next = if dist <= step || dist == 0.0 {
            target
        } else {
            pose.position + to_go * (step / dist)
        };
        s.poses.insert(agent, Pose::new(next, pose.yaw_degrees));
    }

    fn set_collision_mode(&mut self, agent: AgentId, mode: CollisionMode) {
        self.state.borrow_mut().collision_modes.push((agent, mode));
    }

    fn is_free(&self, point: Vec3, radius: f32) -> bool {
        let s = self.state.borrow();
        !s.all_blocked
            && s
                .obstacles
                .iter()
                .all(|(c, r)| c.distance(point) > r + radius)
    }

    fn set_room_yaw(&mut self, room: RoomId, yaw_degrees: f32) {
        self.state.borrow_mut().room_yaws.push((room, yaw_degrees));
    }

    fn set_target(&mut self, position: Vec3) {
        self.state.borrow_mut().target = Some(position);
    }

    fn advance(&mut self, _dt: f64) -> ContactBatch {
        let mut s = self.state.borrow_mut();
        s.advances += 1;
        s.pending.drain(..).collect()
    }
}

// ── ScriptedSampler ────────────────────────────────────────────────

/// [`SpawnSampler`] that replays queued answers.
///
/// With an empty script it reports exhaustion, so fallback paths can
/// be exercised without a predicate that rejects everything.
#[derive(Clone, Default)]
pub struct ScriptedSampler {
    script: Rc<RefCell<VecDeque<Vec3>>>,
    calls: Rc<RefCell<u32>>,
}

impl ScriptedSampler {
    pub fn new(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            script: Rc::new(RefCell::new(points.into_iter().collect())),
            calls: Rc::default(),
        }
    }

    pub fn push(&self, point: Vec3) {
        self.script.borrow_mut().push_back(point);
    }

    pub fn calls(&self) -> u32 {
        *self.calls.borrow()
    }
}

impl SpawnSampler for ScriptedSampler {
    fn sample(
        &mut self,
        _bounds: &Bounds,
        _is_free: &dyn Fn(Vec3) -> bool,
        max_attempts: u32,
    ) -> Result<Vec3, SampleError> {
        *self.calls.borrow_mut() += 1;
        self.script
            .borrow_mut()
            .pop_front()
            .ok_or(SampleError::Exhausted {
                attempts: max_attempts,
            })
    }
}

// ── ScriptedTrainer ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TrainerLog {
    pub observations: Vec<Observation>,
    pub summaries: Vec<EpisodeSummary>,
}

/// [`Trainer`] that always answers with the same action and records
/// what it was shown.
#[derive(Clone)]
pub struct ScriptedTrainer {
    action: Rc<RefCell<Action>>,
    log: Rc<RefCell<TrainerLog>>,
}

impl ScriptedTrainer {
    pub fn new(action: Action) -> Self {
        Self {
            action: Rc::new(RefCell::new(action)),
            log: Rc::default(),
        }
    }

    pub fn set_action(&self, action: Action) {
        *self.action.borrow_mut() = action;
    }

    pub fn log(&self) -> Ref<'_, TrainerLog> {
        self.log.borrow()
    }

    pub fn summaries(&self) -> Vec<EpisodeSummary> {
        self.log.borrow().summaries.clone()
    }

    pub fn act_count(&self) -> usize {
        self.log.borrow().observations.len()
    }
}

impl Default for ScriptedTrainer {
    fn default() -> Self {
        Self::new(Action::IDLE)
    }
}

impl Trainer for ScriptedTrainer {
    fn act(&mut self, _agent: AgentId, obs: &Observation) -> Action {
        self.log.borrow_mut().observations.push(*obs);
        *self.action.borrow()
    }

    fn end_group_episode(&mut self, summary: &EpisodeSummary) {
        self.log.borrow_mut().summaries.push(summary.clone());
    }
}
