//! Inbound port: the ledger mirror API.

use crate::domain::ReconcileReport;
use crate::error::MirrorResult;
use crate::ports::outbound::ReceiptSource;
use async_trait::async_trait;
use shared_types::{ComplaintEvent, ComplaintId, Hash, Ticket, TicketId, Timestamp};

#[async_trait]
pub trait LedgerMirrorApi: Send + Sync {
    /// Append an event to its complaint's log. Returns it with `seq` set.
    fn append(&self, event: ComplaintEvent) -> MirrorResult<ComplaintEvent>;

    /// Project a ticket's state onto the event it backs, if any.
    fn apply_ticket(&self, ticket: &Ticket) -> Option<ComplaintEvent>;

    /// Move a FAILED event onto the ticket that resubmits it.
    fn rebind_ticket(&self, failed: TicketId, ticket: &Ticket) -> MirrorResult<ComplaintEvent>;

    /// All events of a complaint in sequence order.
    fn query_events(&self, complaint_id: &ComplaintId) -> Vec<ComplaintEvent>;

    fn confirmed_events(&self, complaint_id: &ComplaintId) -> Vec<ComplaintEvent>;

    fn find_by_payload_hash(&self, payload_hash: &Hash) -> Option<ComplaintEvent>;

    /// The complaint's event carrying `payload_hash`. Hashes of another
    /// complaint's events never match.
    fn find_event(&self, complaint_id: &ComplaintId, payload_hash: &Hash)
        -> Option<ComplaintEvent>;

    fn event_for_ticket(&self, ticket_id: &TicketId) -> Option<ComplaintEvent>;

    /// SUBMITTED events whose submission is at least `stale_after` seconds
    /// old at `now`, oldest first.
    fn stale_submitted(&self, now: Timestamp, stale_after: u64) -> Vec<ComplaintEvent>;

    /// Refresh stale SUBMITTED events from `source`.
    async fn reconcile(&self, source: &dyn ReceiptSource, now: Timestamp) -> ReconcileReport;
}
