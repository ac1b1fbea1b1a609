//! Inbound port: the submitter API.

use crate::domain::{PollReport, Reservation};
use crate::error::SubmitterResult;
use async_trait::async_trait;
use shared_types::{Hash, SubmissionStatus, Ticket, TicketId, TicketMetadata};

/// Transaction submission API.
#[async_trait]
pub trait TransactionSubmitterApi: Send + Sync {
    /// Deduplicate on `payload_hash` and create a PENDING ticket if needed.
    /// Never touches the ledger.
    fn reserve(&self, payload_hash: Hash, metadata: TicketMetadata) -> Reservation;

    /// Allocate a nonce, sign and broadcast a PENDING ticket.
    /// A ticket that is no longer PENDING is returned unchanged.
    async fn broadcast(&self, ticket_id: TicketId) -> SubmitterResult<Ticket>;

    /// `reserve` then `broadcast`.
    async fn submit(&self, payload_hash: Hash, metadata: TicketMetadata) -> SubmitterResult<Ticket>;

    /// Re-submit a FAILED ticket's payload under a new ticket.
    async fn resubmit(&self, ticket_id: TicketId) -> SubmitterResult<Ticket>;

    /// One confirmation pass over every SUBMITTED ticket.
    async fn poll_pending(&self) -> SubmitterResult<PollReport>;

    /// Re-query the receipt of one ticket without replacing it.
    async fn refresh(&self, ticket_id: TicketId) -> SubmitterResult<Ticket>;

    fn ticket(&self, ticket_id: &TicketId) -> Option<Ticket>;

    fn tickets_with_status(&self, status: SubmissionStatus) -> Vec<Ticket>;
}
