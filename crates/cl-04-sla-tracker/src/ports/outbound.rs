//! Outbound ports.

use async_trait::async_trait;
use shared_types::{LedgerError, SlaDeadline, TicketId};

/// Receives SLA transitions that must reach the audit trail.
#[async_trait]
pub trait EscalationSink: Send + Sync {
    /// A deadline was created or extended. Returns the ticket anchoring it.
    async fn deadline_set(&self, deadline: &SlaDeadline) -> Result<TicketId, LedgerError>;

    /// The complaint moved ACTIVE → ESCALATED. Called exactly once per
    /// complaint.
    async fn escalated(&self, deadline: &SlaDeadline) -> Result<(), LedgerError>;
}
