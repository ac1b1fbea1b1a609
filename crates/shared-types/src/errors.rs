//! # Error Types
//!
//! The ledger-wide error taxonomy. Each component keeps its own error enum
//! and converts into [`LedgerError`] at the runtime boundary.

use thiserror::Error;

/// Malformed input, rejected synchronously and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("complaint id must not be empty")]
    EmptyComplaintId,

    #[error("complaint id is {len} characters, maximum is {max}")]
    ComplaintIdTooLong { len: usize, max: usize },

    #[error("complaint id contains invalid character {ch:?}")]
    InvalidComplaintIdChar { ch: char },

    #[error("unrecognized event type: {0}")]
    UnknownEventType(String),

    #[error("{0}")]
    Invalid(String),
}

/// Broad category of a failure, used for propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    TransientChain,
    PermanentChain,
    DuplicateSubmission,
    Integrity,
    Storage,
    Unauthorized,
    NotFound,
    Unavailable,
}

/// Errors surfaced to callers of the complaint ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// RPC timeout, nonce too low, node unavailable. Retried internally.
    #[error("transient chain error: {0}")]
    TransientChain(String),

    /// Revert, insufficient funds. The ticket is FAILED.
    #[error("permanent chain error: {0}")]
    PermanentChain(String),

    /// Not a failure; the existing ticket or record is authoritative.
    #[error("duplicate submission of {existing}")]
    DuplicateSubmission { existing: String },

    /// Anchored hash no longer matches the stored content.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Evidence could not be persisted or read back.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Component is shutting down or saturated.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::TransientChain(_) => ErrorKind::TransientChain,
            LedgerError::PermanentChain(_) => ErrorKind::PermanentChain,
            LedgerError::DuplicateSubmission { .. } => ErrorKind::DuplicateSubmission,
            LedgerError::Integrity(_) => ErrorKind::Integrity,
            LedgerError::Storage(_) => ErrorKind::Storage,
            LedgerError::Unauthorized(_) => ErrorKind::Unauthorized,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Only transient chain errors are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::TransientChain
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}

/// Result alias used at the runtime boundary.
pub type LedgerResult<T> = Result<T, LedgerError>;
