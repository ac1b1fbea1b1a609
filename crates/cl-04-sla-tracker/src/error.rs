//! Error types for the SLA tracker.

use shared_types::{ComplaintId, LedgerError, Timestamp};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlaError {
    #[error("deadline {deadline_ts} is not in the future (now {now})")]
    DeadlineNotInFuture { deadline_ts: Timestamp, now: Timestamp },

    /// Deadlines only ever move forward.
    #[error("deadline {requested} is earlier than the current deadline {current}")]
    DeadlineMovedEarlier {
        current: Timestamp,
        requested: Timestamp,
    },

    #[error("complaint {0} is already escalated")]
    AlreadyEscalated(ComplaintId),
}

pub type SlaResult<T> = Result<T, SlaError>;

impl From<SlaError> for LedgerError {
    fn from(err: SlaError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
