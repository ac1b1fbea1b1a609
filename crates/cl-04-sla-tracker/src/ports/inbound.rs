//! Inbound port: the SLA tracker API.

use crate::domain::SlaStatus;
use crate::error::SlaResult;
use async_trait::async_trait;
use shared_types::{ComplaintId, SlaDeadline, Timestamp};

#[async_trait]
pub trait SlaTrackerApi: Send + Sync {
    /// Create or extend a complaint's deadline.
    async fn set_deadline(
        &self,
        complaint_id: &ComplaintId,
        deadline_ts: Timestamp,
    ) -> SlaResult<SlaDeadline>;

    /// Escalate if the deadline has passed. True only on the transition.
    async fn check_escalation(&self, complaint_id: &ComplaintId) -> bool;

    /// Check each id independently. Returns how many escalated.
    async fn batch_check_escalation(&self, complaint_ids: &[ComplaintId]) -> usize;

    /// ACTIVE deadlines already past `now`, earliest first.
    fn overdue(&self, now: Timestamp, limit: usize) -> Vec<SlaDeadline>;

    fn status(&self, complaint_id: &ComplaintId) -> SlaStatus;

    fn deadline(&self, complaint_id: &ComplaintId) -> Option<SlaDeadline>;
}
