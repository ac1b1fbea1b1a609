//! Reconciliation report.

use shared_types::{SubmissionStatus, TicketId};

/// A stale event whose receipt could not be re-queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileFailure {
    pub ticket_id: TicketId,
    pub message: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Stale SUBMITTED events examined.
    pub checked: usize,
    /// Events that moved to CONFIRMED.
    pub confirmed: usize,
    /// Events that moved to FAILED.
    pub failed: usize,
    /// Events still SUBMITTED after the refresh.
    pub still_submitted: usize,
    pub errors: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: SubmissionStatus) {
        self.checked += 1;
        match status {
            SubmissionStatus::Confirmed => self.confirmed += 1,
            SubmissionStatus::Failed => self.failed += 1,
            SubmissionStatus::Submitted | SubmissionStatus::Pending => self.still_submitted += 1,
        }
    }

    pub fn add_error(&mut self, ticket_id: TicketId, message: impl Into<String>) {
        self.checked += 1;
        self.errors.push(ReconcileFailure {
            ticket_id,
            message: message.into(),
        });
    }

    /// Events whose status changed in this pass.
    pub fn healed(&self) -> usize {
        self.confirmed + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
