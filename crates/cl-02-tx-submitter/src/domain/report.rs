//! Results returned by the submitter's reserve and poll operations.

use shared_types::{Ticket, TicketId};

/// Outcome of reserving a ticket for a payload hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// A fresh PENDING ticket was created; the caller must broadcast it.
    New(Ticket),
    /// A non-failed ticket already exists for this hash.
    Existing(Ticket),
}

impl Reservation {
    pub fn ticket(&self) -> &Ticket {
        match self {
            Reservation::New(ticket) | Reservation::Existing(ticket) => ticket,
        }
    }

    pub fn into_ticket(self) -> Ticket {
        match self {
            Reservation::New(ticket) | Reservation::Existing(ticket) => ticket,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Reservation::New(_))
    }
}

/// What a single ticket check concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No receipt yet, or receipt below the confirmation depth.
    Waiting,
    Confirmed,
    /// A fee-bumped replacement was broadcast.
    Replaced,
    Failed,
}

/// Summary of one confirmation polling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub head_block: u64,
    pub checked: usize,
    pub confirmed: Vec<TicketId>,
    pub replaced: Vec<TicketId>,
    pub failed: Vec<TicketId>,
    /// Tickets whose check hit an RPC error; retried next pass.
    pub errors: usize,
}

impl PollReport {
    pub(crate) fn record(&mut self, ticket_id: TicketId, outcome: PollOutcome) {
        match outcome {
            PollOutcome::Waiting => {}
            PollOutcome::Confirmed => self.confirmed.push(ticket_id),
            PollOutcome::Replaced => self.replaced.push(ticket_id),
            PollOutcome::Failed => self.failed.push(ticket_id),
        }
    }

    /// Nothing was outstanding.
    pub fn is_idle(&self) -> bool {
        self.checked == 0
    }
}
