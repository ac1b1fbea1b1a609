//! SLA status projection.

use serde::{Deserialize, Serialize};
use shared_types::{SlaDeadline, SlaState, Timestamp};

/// Snapshot of a complaint's SLA position at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaStatus {
    pub state: SlaState,
    pub deadline_ts: Option<Timestamp>,
    pub escalated: bool,
    /// Seconds until the deadline, zero once it has passed.
    pub time_remaining: u64,
    /// Past deadline and still ACTIVE.
    pub should_escalate: bool,
}

impl SlaStatus {
    pub fn no_deadline() -> Self {
        Self {
            state: SlaState::NoDeadline,
            deadline_ts: None,
            escalated: false,
            time_remaining: 0,
            should_escalate: false,
        }
    }

    pub fn of(deadline: &SlaDeadline, now: Timestamp) -> Self {
        Self {
            state: deadline.state(),
            deadline_ts: Some(deadline.deadline_ts),
            escalated: deadline.escalated,
            time_remaining: deadline.deadline_ts.saturating_sub(now),
            should_escalate: super::should_escalate(deadline, now),
        }
    }
}
