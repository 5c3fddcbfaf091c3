//! Turn rotation and hand-off travel.
//!
//! In [`TurnPolicy::SequentialHandoff`] exactly one agent holds control.
//! [`advance_turn`](TurnScheduler::advance_turn) parks it where it
//! stands and sends the next agent in roster order to that stop pose;
//! [`tick_travel`](TurnScheduler::tick_travel) drives the traveller one
//! tick at a time until it is close enough to snap into place.
//!
//! In [`TurnPolicy::Independent`] every agent is active and the
//! scheduler does nothing after reset.

use log::debug;
use wayfind_core::{AgentId, CollisionMode, Physics, Pose};

use crate::agent::{AgentState, TurnPhase};
use crate::config::TurnPolicy;

/// Decides which agent is active and drives hand-off travel.
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    policy: TurnPolicy,
    stop_distance: f32,
    current: Option<usize>,
    last_stop: Option<Pose>,
}

impl TurnScheduler {
    /// A scheduler with no current agent.
    pub fn new(policy: TurnPolicy, stop_distance: f32) -> Self {
        Self {
            policy,
            stop_distance,
            current: None,
            last_stop: None,
        }
    }

    /// The configured policy.
    pub fn policy(&self) -> TurnPolicy {
        self.policy
    }

    /// The agent holding control in sequential mode.
    pub fn current(&self) -> Option<AgentId> {
        match self.policy {
            TurnPolicy::Independent => None,
            TurnPolicy::SequentialHandoff => self.current.map(|i| AgentId(i as u32)),
        }
    }

    /// Whether `agent` holds control. Always true in independent mode.
    pub fn is_current(&self, agent: AgentId) -> bool {
        match self.policy {
            TurnPolicy::Independent => true,
            TurnPolicy::SequentialHandoff => self.current == Some(agent.index()),
        }
    }

    /// Pose where the previous agent was parked, if any.
    pub fn last_stop(&self) -> Option<Pose> {
        self.last_stop
    }

    /// Start a new episode.
    ///
    /// Independent mode activates every agent in place. Sequential mode
    /// parks everyone and hands control to agent 0, which activates in
    /// place since no stop is recorded. Any travel in flight is dropped.
    pub fn reset(&mut self, agents: &mut [AgentState], physics: &mut dyn Physics) {
        self.current = None;
        self.last_stop = None;
        match self.policy {
            TurnPolicy::Independent => {
                for agent in agents.iter_mut() {
                    let id = agent.id();
                    physics.set_collision_mode(id, CollisionMode::Normal);
                    agent.activate(physics.pose(id).position);
                }
            }
            TurnPolicy::SequentialHandoff => {
                for agent in agents.iter_mut() {
                    agent.deactivate();
                }
                self.advance_turn(agents, physics);
            }
        }
    }

    /// Park the current agent and hand control to the next one.
    ///
    /// Returns the agent that now holds control, or `None` in
    /// independent mode or with an empty roster.
    pub fn advance_turn(
        &mut self,
        agents: &mut [AgentState],
        physics: &mut dyn Physics,
    ) -> Option<AgentId> {
        if self.policy == TurnPolicy::Independent || agents.is_empty() {
            return None;
        }
        if let Some(i) = self.current {
            let agent = &mut agents[i];
            physics.stop(agent.id());
            let stop = physics.pose(agent.id());
            agent.deactivate();
            self.last_stop = Some(stop);
        }
        let next = self.current.map_or(0, |i| (i + 1) % agents.len());
        self.current = Some(next);

        let agent = &mut agents[next];
        let id = agent.id();
        match self.last_stop {
            Some(stop) if !stop.position.is_origin() => {
                debug!("agent {id} travelling to {:?}", stop.position);
                physics.set_collision_mode(id, CollisionMode::Travel);
                agent.begin_travel(stop);
            }
            _ => {
                debug!("agent {id} activated in place");
                physics.set_collision_mode(id, CollisionMode::Normal);
                agent.activate(physics.pose(id).position);
            }
        }
        Some(id)
    }

    /// Drive the travelling agent one tick.
    ///
    /// Returns the agent if it arrived this tick: it is snapped to the
    /// stop pose, switched back to its normal collision representation
    /// and activated.
    pub fn tick_travel(
        &mut self,
        agents: &mut [AgentState],
        physics: &mut dyn Physics,
    ) -> Option<AgentId> {
        let i = self.current?;
        let agent = agents.get_mut(i)?;
        let TurnPhase::Traveling { target } = agent.phase() else {
            return None;
        };
        let id = agent.id();
        let here = physics.pose(id).position;
        if here.distance(target.position) <= self.stop_distance {
            physics.set_pose(id, target);
            physics.set_collision_mode(id, CollisionMode::Normal);
            agent.activate(target.position);
            debug!("agent {id} arrived and took control");
            Some(id)
        } else {
            physics.follow_waypoint(id, target.position);
            None
        }
    }
}
