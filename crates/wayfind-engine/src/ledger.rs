//! Group and per-agent reward accumulation.

use log::debug;
use wayfind_core::AgentId;

/// Accumulates rewards between two resets.
///
/// The group return and per-agent returns are independent sums: a
/// reward applied to both is added to each once. After
/// [`finalize`](RewardLedger::finalize) the ledger is sealed and drops
/// every further addition until [`reset`](RewardLedger::reset).
#[derive(Clone, Debug, Default)]
pub struct RewardLedger {
    group: f32,
    agents: Vec<f32>,
    sealed: bool,
    dropped: u64,
}

impl RewardLedger {
    /// An open ledger for `agent_count` agents.
    pub fn new(agent_count: usize) -> Self {
        Self {
            group: 0.0,
            agents: vec![0.0; agent_count],
            sealed: false,
            dropped: 0,
        }
    }

    /// Zero every return and unseal.
    pub fn reset(&mut self, agent_count: usize) {
        self.group = 0.0;
        self.agents.clear();
        self.agents.resize(agent_count, 0.0);
        self.sealed = false;
    }

    /// Add to the group return. Returns whether the reward was applied.
    pub fn add_group(&mut self, reward: f32) -> bool {
        if self.sealed {
            self.dropped += 1;
            debug!("ledger sealed; dropping group reward {reward}");
            return false;
        }
        self.group += reward;
        true
    }

    /// Add to one agent's return. Unknown agents are ignored.
    pub fn add_individual(&mut self, agent: AgentId, reward: f32) -> bool {
        if self.sealed {
            self.dropped += 1;
            debug!("ledger sealed; dropping reward {reward} for agent {agent}");
            return false;
        }
        match self.agents.get_mut(agent.index()) {
            Some(r) => {
                *r += reward;
                true
            }
            None => false,
        }
    }

    /// Seal the ledger and return the group return.
    pub fn finalize(&mut self) -> f32 {
        self.sealed = true;
        self.group
    }

    /// Whether [`finalize`](RewardLedger::finalize) ran since the last reset.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Group return so far.
    pub fn group_return(&self) -> f32 {
        self.group
    }

    /// One agent's return so far.
    pub fn agent_return(&self, agent: AgentId) -> Option<f32> {
        self.agents.get(agent.index()).copied()
    }

    /// Every agent's return in roster order.
    pub fn agent_returns(&self) -> Vec<(AgentId, f32)> {
        self.agents
            .iter()
            .enumerate()
            .map(|(i, &r)| (AgentId(i as u32), r))
            .collect()
    }

    /// Additions dropped because the ledger was sealed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn group_and_individual_are_separate() {
        let mut l = RewardLedger::new(2);
        l.add_group(0.5);
        l.add_individual(AgentId(1), 0.1);
        assert_eq!(l.group_return(), 0.5);
        assert_eq!(l.agent_return(AgentId(0)), Some(0.0));
        assert_eq!(l.agent_return(AgentId(1)), Some(0.1));
    }

    #[test]
    fn unknown_agent_ignored() {
        let mut l = RewardLedger::new(1);
        assert!(!l.add_individual(AgentId(5), 1.0));
        assert_eq!(l.agent_return(AgentId(5)), None);
    }

    #[test]
    fn sealed_ledger_drops_additions() {
        let mut l = RewardLedger::new(1);
        l.add_group(1.0);
        assert_eq!(l.finalize(), 1.0);
        assert!(!l.add_group(5.0));
        assert!(!l.add_individual(AgentId(0), 5.0));
        assert_eq!(l.group_return(), 1.0);
        assert_eq!(l.dropped(), 2);
    }

    #[test]
    fn reset_unseals_and_zeroes() {
        let mut l = RewardLedger::new(1);
        l.add_group(1.0);
        l.finalize();
        l.reset(3);
        assert!(!l.is_sealed());
        assert_eq!(l.group_return(), 0.0);
        assert_eq!(l.agent_returns().len(), 3);
        assert!(l.add_group(0.25));
    }

    proptest! {
        #[test]
        fn finalized_return_is_sum_of_group_adds(
            rewards in proptest::collection::vec(-1.0f32..1.0, 0..50),
        ) {
            let mut l = RewardLedger::new(1);
            let mut expected = 0.0f32;
            for r in &rewards {
                l.add_group(*r);
                expected += *r;
            }
            prop_assert_eq!(l.finalize(), expected);
        }
    }
}
