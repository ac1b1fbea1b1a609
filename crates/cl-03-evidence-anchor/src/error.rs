//! Error types for the evidence anchor.

use crate::ports::outbound::StorageError;
use shared_types::{to_hex, ComplaintId, Hash, LedgerError, SubmissionStatus};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvidenceError {
    #[error("evidence file is empty")]
    EmptyFile,

    /// The file could not be persisted or read back. Nothing was anchored.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No evidence with this content was anchored for the complaint.
    #[error("no evidence {} anchored for complaint {complaint_id}", to_hex(.file_hash))]
    NotAnchored {
        complaint_id: ComplaintId,
        file_hash: Hash,
    },

    /// Verification requires a CONFIRMED record.
    #[error("evidence for complaint {complaint_id} is {status}, not yet confirmed")]
    NotConfirmed {
        complaint_id: ComplaintId,
        status: SubmissionStatus,
    },

    /// Stored content no longer matches the anchored hash.
    #[error("stored evidence {storage_path} hashes to {}, anchored {}", to_hex(.actual), to_hex(.expected))]
    Integrity {
        storage_path: String,
        expected: Hash,
        actual: Hash,
    },

    /// The ledger submission could not be reserved.
    #[error("anchor submission failed: {0}")]
    Submission(LedgerError),
}

pub type EvidenceResult<T> = Result<T, EvidenceError>;

impl From<EvidenceError> for LedgerError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::EmptyFile => LedgerError::Validation(err.to_string()),
            EvidenceError::Storage(_) => LedgerError::Storage(err.to_string()),
            EvidenceError::NotAnchored { .. } => LedgerError::NotFound(err.to_string()),
            EvidenceError::NotConfirmed { .. } => LedgerError::Validation(err.to_string()),
            EvidenceError::Integrity { .. } => LedgerError::Integrity(err.to_string()),
            EvidenceError::Submission(inner) => inner,
        }
    }
}
