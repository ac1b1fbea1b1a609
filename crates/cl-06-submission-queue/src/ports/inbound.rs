//! Inbound port: the submission queue API.

use crate::domain::{QueueStats, SubmissionTask};
use crate::error::QueueResult;
use async_trait::async_trait;

#[async_trait]
pub trait SubmissionQueueApi: Send + Sync {
    /// Accept a task without waiting for it to run.
    fn enqueue(&self, task: SubmissionTask) -> QueueResult<()>;

    /// Reject new tasks. Already accepted tasks still run.
    fn close(&self);

    fn is_closed(&self) -> bool;

    /// Resolve once every accepted task has finished.
    async fn wait_idle(&self);

    fn stats(&self) -> QueueStats;
}
