//! Outbound ports.

use async_trait::async_trait;
use shared_types::{LedgerError, Ticket, TicketId};

/// Fresh ticket state for reconciliation.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Re-query the ledger for the ticket's receipt and return its state.
    async fn refresh(&self, ticket_id: TicketId) -> Result<Ticket, LedgerError>;
}
