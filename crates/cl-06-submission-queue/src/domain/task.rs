//! Submission tasks.

use serde::{Deserialize, Serialize};
use shared_types::{ComplaintId, TicketId, TicketKind};

/// Broadcast one reserved ticket. Tasks of the same complaint run in
/// enqueue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionTask {
    pub complaint_id: ComplaintId,
    pub ticket_id: TicketId,
    pub kind: TicketKind,
}

impl SubmissionTask {
    pub fn new(complaint_id: ComplaintId, ticket_id: TicketId, kind: TicketKind) -> Self {
        Self {
            complaint_id,
            ticket_id,
            kind,
        }
    }
}
