//! Error types for the submission queue.

use shared_types::LedgerError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Backpressure: `max_queued` tasks are already waiting or running.
    #[error("submission queue full ({capacity} tasks)")]
    Full { capacity: usize },

    #[error("submission queue is closed")]
    Closed,
}

pub type QueueResult<T> = Result<T, QueueError>;

impl From<QueueError> for LedgerError {
    fn from(err: QueueError) -> Self {
        LedgerError::Unavailable(err.to_string())
    }
}
