//! Outbound ports.

use crate::domain::SubmissionTask;
use async_trait::async_trait;
use shared_types::LedgerError;

/// Runs one task. The queue does not retry; retry policy belongs to the
/// executor.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &SubmissionTask) -> Result<(), LedgerError>;
}
