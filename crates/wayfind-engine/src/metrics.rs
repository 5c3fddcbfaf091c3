//! Cumulative counters for the episode core.
//!
//! [`EpisodeMetrics`] is updated in place by the orchestrator and cloned
//! into every [`StepResult`](crate::lockstep::StepResult). All counters
//! are cumulative since construction; resets do not clear them.

use wayfind_core::TerminalReason;

/// Counters collected by the episode orchestrator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeMetrics {
    /// Ticks completed.
    pub ticks: u64,
    /// Episodes that reached a terminal condition.
    pub episodes_completed: u64,
    /// Terminations per reason, indexed by [`TerminalReason::index`].
    pub terminations: [u64; 4],
    /// Terminal notifications dropped by the at-most-once guard.
    pub duplicate_terminals_dropped: u64,
    /// Non-terminal obstacle hits that only applied a penalty.
    pub obstacle_penalties: u64,
    /// Non-goal rooms discovered.
    pub rooms_discovered: u64,
    /// Hand-offs between agents in sequential mode.
    pub handoffs: u64,
    /// Spawns that fell back to the area center.
    pub spawn_fallbacks: u64,
    /// Radius goal selections that fell back to global selection.
    pub radius_fallbacks: u64,
    /// Events naming an unknown agent or room, or an agent not in its
    /// active phase.
    pub ignored_events: u64,
}

impl EpisodeMetrics {
    /// Terminations recorded for `reason`.
    pub fn terminations_for(&self, reason: TerminalReason) -> u64 {
        self.terminations[reason.index()]
    }

    pub(crate) fn record_termination(&mut self, reason: TerminalReason) {
        self.episodes_completed += 1;
        self.terminations[reason.index()] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = EpisodeMetrics::default();
        assert_eq!(m.ticks, 0);
        assert_eq!(m.episodes_completed, 0);
        assert_eq!(m.terminations, [0; 4]);
        assert_eq!(m.duplicate_terminals_dropped, 0);
        assert_eq!(m.handoffs, 0);
        assert_eq!(m.ignored_events, 0);
    }

    #[test]
    fn record_termination_counts_per_reason() {
        let mut m = EpisodeMetrics::default();
        m.record_termination(TerminalReason::Timeout);
        m.record_termination(TerminalReason::Timeout);
        m.record_termination(TerminalReason::GoalReached);
        assert_eq!(m.episodes_completed, 3);
        assert_eq!(m.terminations_for(TerminalReason::Timeout), 2);
        assert_eq!(m.terminations_for(TerminalReason::GoalReached), 1);
        assert_eq!(m.terminations_for(TerminalReason::Stuck), 0);
    }
}
