//! Error types for the event encoder.

use shared_types::{LedgerError, ValidationError};
use thiserror::Error;

/// Event encoder errors. Every variant is a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    /// Complaint id or event type rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The payload must be a JSON object.
    #[error("payload must be a JSON object, got {found}")]
    PayloadNotObject { found: &'static str },
}

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

impl From<EncoderError> for LedgerError {
    fn from(err: EncoderError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
