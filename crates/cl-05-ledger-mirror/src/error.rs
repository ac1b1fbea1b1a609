//! Error types for the ledger mirror.

use shared_types::{ComplaintId, LedgerError, SubmissionStatus, TicketId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    /// Each ticket backs at most one event.
    #[error("ticket {ticket_id} already mirrored for complaint {complaint_id}")]
    DuplicateTicket {
        ticket_id: TicketId,
        complaint_id: ComplaintId,
    },

    #[error("no event mirrored for ticket {0}")]
    UnknownTicket(TicketId),

    /// Only FAILED events can be rebound to a resubmitted ticket.
    #[error("event for ticket {ticket_id} is {status}, only FAILED events can be resubmitted")]
    NotFailed {
        ticket_id: TicketId,
        status: SubmissionStatus,
    },
}

pub type MirrorResult<T> = Result<T, MirrorError>;

impl From<MirrorError> for LedgerError {
    fn from(err: MirrorError) -> Self {
        match err {
            MirrorError::DuplicateTicket { ticket_id, .. } => {
                LedgerError::DuplicateSubmission {
                    existing: ticket_id.to_string(),
                }
            }
            MirrorError::UnknownTicket(_) => LedgerError::NotFound(err.to_string()),
            MirrorError::NotFailed { .. } => LedgerError::Validation(err.to_string()),
        }
    }
}
