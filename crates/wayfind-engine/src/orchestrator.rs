//! The episode state machine.
//!
//! [`EpisodeOrchestrator`] owns the room registry, the turn scheduler,
//! the reward ledger and the agent roster, and reacts to the events the
//! physics collaborator reports. It cycles
//! `Resetting → Active → Terminating → Resetting`.
//!
//! # Termination guard
//!
//! Terminal notifications are honored at most once per episode. The
//! first one clears `episode_active`, finalizes the ledger and queues an
//! [`EpisodeSummary`]; every later notification is dropped until the
//! next episode is active *and* a new tick has begun. The second half
//! matters when the reset runs immediately: contacts still queued in the
//! same tick belong to the finished episode and must not leak into the
//! fresh one.
//!
//! # Time
//!
//! Episode duration is measured in simulated seconds accumulated by
//! [`end_tick`](EpisodeOrchestrator::end_tick), which keeps runs with the
//! same seed and event stream identical.

use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wayfind_core::{
    Action, AgentId, CollisionCategory, ConfigError, ContactBatch, ContactEvent, EpisodeId,
    EpisodeSummary, Observation, Physics, Pose, RoomId, SpawnSampler, TerminalReason, Vec3,
    ZoneRef,
};
use wayfind_rooms::{random_yaw, sample_or_fallback, Room, RoomEntry, RoomRegistry};

use crate::agent::{AgentState, TurnPhase};
use crate::config::{DiscoveryGroupReward, EnvConfig, SpawnMode, TurnPolicy};
use crate::ledger::RewardLedger;
use crate::metrics::EpisodeMetrics;
use crate::scheduler::TurnScheduler;

/// Lifecycle state of the current episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Between episodes; the initial state.
    Resetting,
    /// Accepting actions and events.
    Active,
    /// A terminal condition fired; waiting for the reset.
    Terminating,
}

/// Top-level state machine of the exploration environment.
pub struct EpisodeOrchestrator {
    config: EnvConfig,
    rooms: RoomRegistry,
    scheduler: TurnScheduler,
    ledger: RewardLedger,
    agents: Vec<AgentState>,
    physics: Box<dyn Physics>,
    sampler: Box<dyn SpawnSampler>,
    rng: ChaCha8Rng,
    phase: EpisodePhase,
    episode_active: bool,
    reset_pending: bool,
    terminated_this_tick: bool,
    tick_open: bool,
    restarted_mid_tick: bool,
    episode: EpisodeId,
    episodes_started: u64,
    sim_time: f64,
    episode_start: f64,
    episode_ticks: u64,
    target: Vec3,
    metrics: EpisodeMetrics,
    completed: Vec<EpisodeSummary>,
}

impl EpisodeOrchestrator {
    /// Validate the configuration and build an orchestrator in the
    /// `Resetting` state. Call [`reset`](Self::reset) to start the
    /// first episode.
    ///
    /// `homes` defines the roster: agent `i` has home pose `homes[i]`.
    pub fn new(
        config: EnvConfig,
        rooms: Vec<Room>,
        homes: Vec<Pose>,
        physics: Box<dyn Physics>,
        sampler: Box<dyn SpawnSampler>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if homes.is_empty() {
            return Err(ConfigError::NoAgents);
        }
        let rooms = RoomRegistry::new(rooms)?;
        let agents: Vec<AgentState> = homes
            .into_iter()
            .enumerate()
            .map(|(i, home)| AgentState::new(AgentId(i as u32), home))
            .collect();
        let scheduler = TurnScheduler::new(config.turn_policy, config.stop_distance);
        let ledger = RewardLedger::new(agents.len());
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rooms,
            scheduler,
            ledger,
            agents,
            physics,
            sampler,
            rng,
            phase: EpisodePhase::Resetting,
            episode_active: false,
            reset_pending: false,
            terminated_this_tick: false,
            tick_open: false,
            restarted_mid_tick: false,
            episode: EpisodeId(0),
            episodes_started: 0,
            sim_time: 0.0,
            episode_start: 0.0,
            episode_ticks: 0,
            target: Vec3::ZERO,
            metrics: EpisodeMetrics::default(),
            completed: Vec::new(),
        })
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Start a new episode.
    ///
    /// Re-initializes every room, spawns the agents, selects the goal
    /// room and target, clears the ledger and every agent's exploration
    /// state, and hands control to agent 0. Any hand-off in flight is
    /// cancelled.
    pub fn reset(&mut self) {
        self.phase = EpisodePhase::Resetting;

        self.rooms.initialize_all(&mut self.rng);
        for room in self.rooms.iter().filter(|r| r.has_random_rotation()) {
            self.physics.set_room_yaw(room.id(), room.yaw_degrees());
        }

        self.spawn_agents();

        let anchor = self.agents[0].spawn().position;
        match self
            .rooms
            .select_goal(&self.config.goal_selection, anchor, &mut self.rng)
        {
            Ok(pick) => {
                if pick.fell_back {
                    self.metrics.radius_fallbacks += 1;
                }
                if let Some(room) = self.rooms.get(pick.room) {
                    self.target = self.config.target.place(room.center(), &mut self.rng);
                    self.physics.set_target(self.target);
                }
            }
            // Unreachable with a non-empty registry.
            Err(e) => warn!("goal selection failed: {e}"),
        }

        self.ledger.reset(self.agents.len());
        self.scheduler.reset(&mut self.agents, self.physics.as_mut());

        self.episode = EpisodeId(self.episodes_started);
        self.episodes_started += 1;
        self.episode_active = true;
        self.reset_pending = false;
        self.episode_start = self.sim_time;
        // Restarted by a contact: the rest of this tick belongs to the
        // finished episode, so the clock starts when the tick ends.
        self.restarted_mid_tick = self.tick_open;
        self.episode_ticks = 0;
        self.phase = EpisodePhase::Active;
        debug!(
            "episode {} started: goal room {:?}, target {:?}",
            self.episode,
            self.rooms.goal(),
            self.target
        );
    }

    /// Reseed the environment stream and start a new episode.
    ///
    /// The spawn sampler keeps its own stream.
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.reset();
    }

    fn spawn_agents(&mut self) {
        let spawn = &self.config.spawn;
        for agent in self.agents.iter_mut() {
            let home = agent.home();
            let position = match (spawn.mode, spawn.area) {
                (SpawnMode::Random, Some(area)) => {
                    let physics = &*self.physics;
                    let clearance = spawn.clearance_radius;
                    let is_free = |p: Vec3| physics.is_free(p, clearance);
                    let point = sample_or_fallback(
                        self.sampler.as_mut(),
                        &area,
                        &is_free,
                        spawn.max_attempts,
                        spawn.height,
                    );
                    if point.fell_back {
                        self.metrics.spawn_fallbacks += 1;
                    }
                    point.position
                }
                _ => home.position,
            };
            let yaw = if spawn.randomize_yaw {
                random_yaw(&mut self.rng)
            } else {
                home.yaw_degrees
            };
            let pose = Pose::new(position, yaw);
            self.physics.stop(agent.id());
            self.physics.set_pose(agent.id(), pose);
            agent.reset_episode(pose);
        }
    }

    /// Mark the start of a tick. Runs a deferred reset and re-opens the
    /// termination guard.
    pub fn begin_tick(&mut self) {
        self.terminated_this_tick = false;
        if self.reset_pending {
            self.reset();
        }
        self.tick_open = true;
    }

    /// Mark the end of a tick of `dt` seconds and run the time-based
    /// checks: stuck detection, then the episode timeout.
    pub fn end_tick(&mut self, dt: f64) {
        self.sim_time += dt;
        self.tick_open = false;
        if self.restarted_mid_tick {
            self.episode_start = self.sim_time;
            self.restarted_mid_tick = false;
        }
        self.metrics.ticks += 1;
        if !self.accepting() {
            return;
        }
        self.episode_ticks += 1;

        if let Some(timeout) = self.config.stuck.timeout_secs {
            let min_progress = self.config.stuck.min_progress;
            let mut stuck = None;
            for agent in self.agents.iter_mut().filter(|a| a.is_active()) {
                let here = self.physics.pose(agent.id()).position;
                if agent.track_progress(here, dt, min_progress) > timeout {
                    stuck = Some(agent.id());
                    break;
                }
            }
            if let Some(agent) = stuck {
                self.notify_stuck(agent);
                return;
            }
        }

        if self.sim_time - self.episode_start > self.config.max_episode_duration {
            self.terminate(TerminalReason::Timeout, None);
        }
    }

    fn accepting(&self) -> bool {
        self.episode_active && !self.terminated_this_tick
    }

    fn terminate(&mut self, reason: TerminalReason, agent: Option<AgentId>) -> bool {
        if !self.accepting() {
            self.metrics.duplicate_terminals_dropped += 1;
            debug!("dropping {reason} notification: episode {} already ending", self.episode);
            return false;
        }
        self.episode_active = false;
        self.terminated_this_tick = true;
        self.phase = EpisodePhase::Terminating;

        let reward = self.config.rewards.terminal(reason);
        self.ledger.add_group(reward);
        if let Some(id) = agent {
            self.ledger.add_individual(id, reward);
        }
        let group_return = self.ledger.finalize();
        let summary = EpisodeSummary {
            episode: self.episode,
            reason,
            agent,
            group_return,
            agent_returns: self.ledger.agent_returns(),
            ticks: self.episode_ticks,
            duration_secs: self.sim_time - self.episode_start,
            rooms_visited: self.rooms.visited_count(),
        };
        info!(
            "episode {} ended: {reason} after {} ticks, group return {group_return:.3}",
            summary.episode, summary.ticks
        );
        self.metrics.record_termination(reason);
        self.completed.push(summary);

        if self.config.defer_reset {
            if let Some(id) = agent {
                self.agents[id.index()].terminal_fired = true;
            }
            self.reset_pending = true;
        } else {
            self.reset();
        }
        true
    }

    // ── Terminal notifications ─────────────────────────────────────

    /// `agent` touched the target. Returns whether the episode ended.
    pub fn notify_goal_reached(&mut self, agent: AgentId) -> bool {
        if !self.known_agent(agent) {
            return false;
        }
        self.terminate(TerminalReason::GoalReached, Some(agent))
    }

    /// `agent` hit a wall or another agent.
    ///
    /// Ends the episode when `obstacle_hit_terminates` is set; otherwise
    /// only applies the penalty. Returns whether the episode ended.
    pub fn notify_obstacle_hit(&mut self, agent: AgentId) -> bool {
        if !self.known_agent(agent) {
            return false;
        }
        if self.config.obstacle_hit_terminates {
            return self.terminate(TerminalReason::ObstacleHit, Some(agent));
        }
        if self.accepting() {
            let penalty = self.config.rewards.obstacle_hit;
            self.ledger.add_group(penalty);
            self.ledger.add_individual(agent, penalty);
            self.metrics.obstacle_penalties += 1;
        }
        false
    }

    /// `agent` is stuck. Returns whether the episode ended.
    pub fn notify_stuck(&mut self, agent: AgentId) -> bool {
        if !self.known_agent(agent) {
            return false;
        }
        self.terminate(TerminalReason::Stuck, Some(agent))
    }

    // ── Room events ────────────────────────────────────────────────

    /// Reward `agent` for discovering a new room. Returns whether the
    /// reward was applied.
    pub fn notify_room_discovered(&mut self, agent: AgentId) -> bool {
        if !self.accepting() || !self.known_agent(agent) {
            return false;
        }
        let r = &self.config.rewards;
        let group = match self.config.discovery_group_reward {
            DiscoveryGroupReward::Discovery => Some(r.room_discovered),
            DiscoveryGroupReward::FoundGoalRoom => Some(r.found_goal_room),
            DiscoveryGroupReward::None => None,
        };
        self.ledger.add_individual(agent, r.room_discovered);
        if let Some(g) = group {
            self.ledger.add_group(g);
        }
        self.metrics.rooms_discovered += 1;
        true
    }

    /// `agent` entered `room`'s trigger zone.
    pub fn on_agent_entered_room(&mut self, agent: AgentId, room: RoomId) {
        if !self.exploring(agent) {
            return;
        }
        let state = &self.agents[agent.index()];
        let entry = match self.rooms.enter(room, state.goal_room_found) {
            Ok(entry) => entry,
            Err(e) => {
                self.ignore(format_args!("enter from agent {agent}: {e}"));
                return;
            }
        };
        let rewards = &self.config.rewards;
        let state = &mut self.agents[agent.index()];
        state.enter_room(room);
        match entry {
            RoomEntry::FoundGoalRoom => {
                state.goal_room_found = true;
                self.ledger.add_group(rewards.found_goal_room);
                self.ledger.add_individual(agent, rewards.found_goal_room);
                debug!("agent {agent} found goal room {room}");
            }
            RoomEntry::GoalRoomAgain => {}
            RoomEntry::Revisit => {
                state.revisiting = true;
                self.ledger.add_individual(agent, rewards.room_revisited);
            }
            RoomEntry::Discovered => {
                state.explored_new_rooms += 1;
                self.notify_room_discovered(agent);
            }
        }
    }

    /// `agent` left `room`'s trigger zone.
    ///
    /// Only an exit from the agent's current room counts; crossing
    /// between adjacent rooms reports the new entry before the old exit.
    /// Non-goal rooms are forced to visited. In sequential mode, an
    /// active agent that has used up its room-exploration budget hands
    /// off here.
    pub fn on_agent_exited_room(&mut self, agent: AgentId, room: RoomId) {
        if !self.exploring(agent) {
            return;
        }
        if self.agents[agent.index()].current_room != Some(room) {
            self.ignore(format_args!("exit from agent {agent}: not in room {room}"));
            return;
        }
        if let Err(e) = self.rooms.exit(room) {
            self.ignore(format_args!("exit from agent {agent}: {e}"));
            return;
        }
        let budget = self.config.max_explorer_room_count;
        let state = &mut self.agents[agent.index()];
        state.exit_room();
        if self.config.turn_policy == TurnPolicy::SequentialHandoff
            && budget > 0
            && state.explored_new_rooms >= budget
            && self.scheduler.is_current(agent)
        {
            state.explored_new_rooms = 0;
            debug!("agent {agent} used its budget of {budget} rooms");
            self.advance_turn();
        }
    }

    /// `agent` passed through `room`'s door.
    pub fn on_door_entered(&mut self, agent: AgentId, room: RoomId) {
        if !self.exploring(agent) {
            return;
        }
        match self.rooms.pass_door(room) {
            Ok(true) => {
                self.ledger.add_individual(agent, self.config.rewards.door);
                debug!("agent {agent} passed the goal door of room {room}");
            }
            Ok(false) => {}
            Err(e) => self.ignore(format_args!("door from agent {agent}: {e}")),
        }
    }

    /// Route one contact to its handler.
    pub fn dispatch(&mut self, event: ContactEvent) {
        match event {
            ContactEvent::Collision {
                agent, category, ..
            } => match category {
                CollisionCategory::Target => {
                    self.notify_goal_reached(agent);
                }
                CollisionCategory::Wall | CollisionCategory::Agent => {
                    self.notify_obstacle_hit(agent);
                }
                CollisionCategory::Other => {}
            },
            ContactEvent::TriggerEnter { agent, zone } => match zone {
                ZoneRef::Room(room) => self.on_agent_entered_room(agent, room),
                ZoneRef::Door(room) => self.on_door_entered(agent, room),
            },
            ContactEvent::TriggerExit { agent, zone } => {
                if let ZoneRef::Room(room) = zone {
                    self.on_agent_exited_room(agent, room);
                }
            }
            ContactEvent::Stuck { agent } => {
                self.notify_stuck(agent);
            }
        }
    }

    /// Dispatch a whole batch in delivery order.
    pub fn dispatch_all(&mut self, batch: ContactBatch) {
        for event in batch {
            self.dispatch(event);
        }
    }

    fn known_agent(&mut self, agent: AgentId) -> bool {
        if agent.index() < self.agents.len() {
            return true;
        }
        self.ignore(format_args!("unknown agent {agent}"));
        false
    }

    /// Room events count only from agents in their active phase while
    /// the episode accepts events.
    fn exploring(&mut self, agent: AgentId) -> bool {
        if !self.accepting() || !self.known_agent(agent) {
            return false;
        }
        if !self.agents[agent.index()].is_active() {
            self.ignore(format_args!("room event from inactive agent {agent}"));
            return false;
        }
        true
    }

    fn ignore(&mut self, what: std::fmt::Arguments<'_>) {
        self.metrics.ignored_events += 1;
        debug!("ignoring event: {what}");
    }

    // ── Actions and turns ──────────────────────────────────────────

    /// Forward `action` to physics for an active agent and apply the
    /// per-step penalty and approach shaping. Returns whether the action
    /// was applied.
    pub fn apply_action(&mut self, agent: AgentId, action: Action) -> bool {
        if !self.accepting() || !self.known_agent(agent) {
            return false;
        }
        if !self.agents[agent.index()].is_active() {
            return false;
        }
        self.physics.apply_action(agent, &action.clamped());
        self.ledger.add_individual(agent, self.config.step_penalty_per_step());

        let r = &self.config.rewards;
        if r.approach_radius > 0.0 {
            let d = self.distance_to_target(agent);
            if d < r.approach_radius {
                let closeness = (r.approach_radius - d) / r.approach_radius;
                let shaping = r.approach_reward * self.config.dt as f32 * closeness;
                self.ledger.add_individual(agent, shaping);
            }
        }
        true
    }

    /// Hand control to the next agent (sequential mode only).
    pub fn advance_turn(&mut self) -> Option<AgentId> {
        let next = self
            .scheduler
            .advance_turn(&mut self.agents, self.physics.as_mut());
        if next.is_some() {
            self.metrics.handoffs += 1;
        }
        next
    }

    /// Drive a travelling agent one tick. Returns it if it arrived.
    pub fn tick_travel(&mut self) -> Option<AgentId> {
        self.scheduler.tick_travel(&mut self.agents, self.physics.as_mut())
    }

    /// Integrate one physics step and return the contacts it produced.
    pub fn advance_physics(&mut self, dt: f64) -> ContactBatch {
        let batch = self.physics.advance(dt);
        trace!("physics produced {} contacts", batch.len());
        batch
    }

    // ── Observation and accessors ──────────────────────────────────

    /// The exploration observation for `agent`, or `None` if unknown.
    pub fn observe(&self, agent: AgentId) -> Option<Observation> {
        let state = self.agents.get(agent.index())?;
        Some(state.observe(self.distance_to_target(agent)))
    }

    fn distance_to_target(&self, agent: AgentId) -> f32 {
        self.physics.pose(agent).position.distance(self.target)
    }

    /// Summaries of episodes that ended since the last drain.
    pub fn drain_completed(&mut self) -> Vec<EpisodeSummary> {
        std::mem::take(&mut self.completed)
    }

    /// Lifecycle state.
    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Whether the current episode still accepts terminal notifications.
    pub fn is_episode_active(&self) -> bool {
        self.episode_active
    }

    /// Whether a deferred reset is waiting for the next tick.
    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Identifier of the current (or just finished) episode.
    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// Turn phase of `agent`.
    pub fn turn_phase(&self, agent: AgentId) -> Option<TurnPhase> {
        self.agents.get(agent.index()).map(AgentState::phase)
    }

    /// Agent ids in roster order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(AgentState::id)
    }

    /// Episode state of `agent`.
    pub fn agent(&self, agent: AgentId) -> Option<&AgentState> {
        self.agents.get(agent.index())
    }

    /// The room registry.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// The reward ledger.
    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    /// The turn scheduler.
    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &EpisodeMetrics {
        &self.metrics
    }

    /// The validated configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Target position of the current episode.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Simulated seconds since construction.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Simulated seconds since the current episode started.
    pub fn episode_elapsed(&self) -> f64 {
        self.sim_time - self.episode_start
    }
}

impl std::fmt::Debug for EpisodeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpisodeOrchestrator")
            .field("phase", &self.phase)
            .field("episode", &self.episode)
            .field("episode_active", &self.episode_active)
            .field("reset_pending", &self.reset_pending)
            .field("agents", &self.agents.len())
            .field("rooms", &self.rooms.len())
            .field("goal", &self.rooms.goal())
            .field("sim_time", &self.sim_time)
            .finish()
    }
}
