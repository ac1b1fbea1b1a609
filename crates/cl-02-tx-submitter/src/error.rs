//! Error types for the transaction submitter.

use crate::ports::outbound::{RpcError, SignerError};
use shared_types::{LedgerError, SubmissionStatus, TicketId};
use thiserror::Error;

/// Transaction submitter errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitterError {
    /// No ticket with this id.
    #[error("unknown ticket {0}")]
    UnknownTicket(TicketId),

    /// Operation not allowed in the ticket's current status.
    #[error("ticket {ticket_id} is {status}, operation not allowed")]
    InvalidState {
        ticket_id: TicketId,
        status: SubmissionStatus,
    },

    /// The remote ledger call failed.
    #[error("ledger rpc failed: {0}")]
    Rpc(#[from] RpcError),

    /// The ledger rejected the transaction; the ticket is FAILED.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The signer could not produce a transaction.
    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),
}

/// Result type for submitter operations.
pub type SubmitterResult<T> = Result<T, SubmitterError>;

impl From<SubmitterError> for LedgerError {
    fn from(err: SubmitterError) -> Self {
        match err {
            SubmitterError::UnknownTicket(_) => LedgerError::NotFound(err.to_string()),
            SubmitterError::InvalidState { .. } => LedgerError::Validation(err.to_string()),
            SubmitterError::Rpc(ref rpc) if rpc.is_transient() => {
                LedgerError::TransientChain(err.to_string())
            }
            SubmitterError::Rpc(_) | SubmitterError::Rejected(_) => {
                LedgerError::PermanentChain(err.to_string())
            }
            SubmitterError::Signing(_) => LedgerError::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ErrorKind;

    #[test]
    fn test_error_taxonomy() {
        let transient: LedgerError = SubmitterError::Rpc(RpcError::Timeout).into();
        assert_eq!(transient.kind(), ErrorKind::TransientChain);

        let permanent: LedgerError =
            SubmitterError::Rpc(RpcError::InsufficientFunds("0 balance".into())).into();
        assert_eq!(permanent.kind(), ErrorKind::PermanentChain);

        let missing: LedgerError = SubmitterError::UnknownTicket(TicketId::nil()).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
