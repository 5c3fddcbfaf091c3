//! Terminal reasons and finished-episode summaries.

use std::fmt;

use crate::id::{AgentId, EpisodeId};

/// Why an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminalReason {
    /// An agent touched the target.
    GoalReached,
    /// An agent hit a wall or another agent.
    ObstacleHit,
    /// An agent made no progress for too long.
    Stuck,
    /// The episode ran past its maximum duration.
    Timeout,
}

impl TerminalReason {
    /// All reasons, in a fixed order. Useful for per-reason counters.
    pub const ALL: [TerminalReason; 4] = [
        TerminalReason::GoalReached,
        TerminalReason::ObstacleHit,
        TerminalReason::Stuck,
        TerminalReason::Timeout,
    ];

    /// Position of this reason in [`ALL`](TerminalReason::ALL).
    pub fn index(self) -> usize {
        match self {
            Self::GoalReached => 0,
            Self::ObstacleHit => 1,
            Self::Stuck => 2,
            Self::Timeout => 3,
        }
    }

    /// Whether the episode hit its time limit rather than ending on its own.
    pub fn is_truncation(self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoalReached => write!(f, "goal reached"),
            Self::ObstacleHit => write!(f, "obstacle hit"),
            Self::Stuck => write!(f, "stuck"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Finalized record of one group episode, delivered to the trainer.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    /// Which episode ended.
    pub episode: EpisodeId,
    /// What ended it.
    pub reason: TerminalReason,
    /// Agent that raised the terminal condition, `None` for timeouts.
    pub agent: Option<AgentId>,
    /// Sum of every group-level reward applied during the episode.
    pub group_return: f32,
    /// Individual return of each agent, in roster order.
    pub agent_returns: Vec<(AgentId, f32)>,
    /// Ticks elapsed between reset and termination.
    pub ticks: u64,
    /// Simulated seconds elapsed between reset and termination.
    pub duration_secs: f64,
    /// Rooms marked visited when the episode ended.
    pub rooms_visited: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_indices_match_all_order() {
        for (i, r) in TerminalReason::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
        }
    }

    #[test]
    fn only_timeout_is_truncation() {
        assert!(TerminalReason::Timeout.is_truncation());
        assert!(!TerminalReason::GoalReached.is_truncation());
        assert!(!TerminalReason::ObstacleHit.is_truncation());
        assert!(!TerminalReason::Stuck.is_truncation());
    }
}
