//! Outbound ports: the remote ledger and the signing key.

use crate::domain::{SignedTransaction, UnsignedTransaction};
use async_trait::async_trait;
use shared_types::{Address, Hash, ReceiptStatus};
use thiserror::Error;

/// Errors reported by a `LedgerRpc` implementation, already classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("rpc call timed out")]
    Timeout,

    #[error("nonce too low: {0}")]
    NonceTooLow(String),

    #[error("replacement transaction underpriced: {0}")]
    Underpriced(String),

    /// The node already has this exact transaction.
    #[error("transaction already known")]
    AlreadyKnown,

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed rpc response: {0}")]
    Decode(String),
}

impl RpcError {
    /// Worth retrying with the same or a resynchronised nonce.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            RpcError::InsufficientFunds(_) | RpcError::Reverted(_)
        )
    }

    /// Map a JSON-RPC error object onto a classified error.
    pub fn classify(code: i64, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("nonce too low") {
            RpcError::NonceTooLow(message.to_string())
        } else if lower.contains("underpriced") {
            RpcError::Underpriced(message.to_string())
        } else if lower.contains("already known") || lower.contains("known transaction") {
            RpcError::AlreadyKnown
        } else if lower.contains("insufficient funds") {
            RpcError::InsufficientFunds(message.to_string())
        } else if lower.contains("revert") {
            RpcError::Reverted(message.to_string())
        } else {
            RpcError::Rpc {
                code,
                message: message.to_string(),
            }
        }
    }
}

/// Receipt as reported by the ledger, before confirmation depth is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub tx_hash: Hash,
    pub block_number: u64,
    pub block_hash: Hash,
    pub status: ReceiptStatus,
    pub gas_used: u64,
}

/// The narrow RPC contract of the remote ledger.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// `eth_sendRawTransaction`. Returns the transaction hash.
    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<Hash, RpcError>;

    /// `eth_getTransactionReceipt`. `None` while not yet included.
    async fn transaction_receipt(&self, tx_hash: &Hash) -> Result<Option<LedgerReceipt>, RpcError>;

    /// `eth_getTransactionCount(address, "pending")`.
    async fn transaction_count(&self, address: &Address) -> Result<u64, RpcError>;

    /// `eth_blockNumber`.
    async fn block_number(&self) -> Result<u64, RpcError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("invalid signing key")]
    InvalidKey,

    #[error("signature failed: {0}")]
    Signature(String),
}

/// Holder of the signing account's key.
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SignerError>;
}
