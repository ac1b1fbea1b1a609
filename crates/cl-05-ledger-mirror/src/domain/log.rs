//! Per-complaint event log.
//!
//! Events are appended in the order the application produced them and get
//! `seq = 1, 2, 3, ...`. Entries are never removed; only their submission
//! projection (status, tx hash, receipt) is updated.

use shared_types::{ComplaintEvent, SubmissionStatus, Ticket, TicketId};

#[derive(Debug, Clone, Default)]
pub struct ComplaintLog {
    events: Vec<ComplaintEvent>,
}

impl ComplaintLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next sequence number and store the event.
    pub fn append(&mut self, mut event: ComplaintEvent) -> ComplaintEvent {
        event.seq = self.events.len() as u64 + 1;
        self.events.push(event.clone());
        event
    }

    pub fn get(&self, seq: u64) -> Option<&ComplaintEvent> {
        let index = usize::try_from(seq.checked_sub(1)?).ok()?;
        self.events.get(index)
    }

    pub fn get_mut(&mut self, seq: u64) -> Option<&mut ComplaintEvent> {
        let index = usize::try_from(seq.checked_sub(1)?).ok()?;
        self.events.get_mut(index)
    }

    /// All events in sequence order.
    pub fn events(&self) -> &[ComplaintEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Copy a ticket's submission state onto its event.
///
/// Status only moves to a higher rank. While SUBMITTED, a replacement
/// transaction hash is still taken. Returns whether anything changed.
pub fn project_ticket(event: &mut ComplaintEvent, ticket: &Ticket) -> bool {
    if event.ticket_id != ticket.id {
        return false;
    }
    let current = event.status.rank();
    let incoming = ticket.status.rank();
    let replaced = ticket.status == SubmissionStatus::Submitted
        && event.status == SubmissionStatus::Submitted
        && event.tx_hash != ticket.tx_hash;

    if incoming <= current && !replaced {
        return false;
    }

    event.status = ticket.status;
    event.tx_hash = ticket.tx_hash;
    event.submitted_at = ticket.submitted_at.or(event.submitted_at);
    event.confirmed_at = ticket.confirmed_at.or(event.confirmed_at);
    if ticket.receipt.is_some() {
        event.receipt = ticket.receipt.clone();
    }
    true
}

/// Point a FAILED event at its resubmission ticket.
pub fn rebind(event: &mut ComplaintEvent, ticket: &Ticket) -> TicketId {
    let previous = event.ticket_id;
    event.ticket_id = ticket.id;
    event.status = ticket.status;
    event.tx_hash = ticket.tx_hash;
    event.submitted_at = ticket.submitted_at;
    event.confirmed_at = None;
    event.receipt = None;
    previous
}
