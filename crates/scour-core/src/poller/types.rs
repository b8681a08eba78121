use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout and poll interval for one confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Terminal classification of one resource's cleanup attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum DeletionOutcome {
    Deleted,
    /// The resource was already absent when we tried to delete it.
    AlreadyGone,
    Failed(String),
    /// Deletion was accepted but not observed complete within budget.
    TimedOut,
}

impl DeletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeletionOutcome::Deleted | DeletionOutcome::AlreadyGone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionOutcome::Deleted => "deleted",
            DeletionOutcome::AlreadyGone => "already_gone",
            DeletionOutcome::Failed(_) => "failed",
            DeletionOutcome::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}
