//! Outbound ports.

use async_trait::async_trait;
use shared_types::{ComplaintId, Hash, LedgerError, Ticket};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("stored file not found: {path}")]
    NotFound { path: String },
}

/// A persisted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub storage_path: String,
    pub size: u64,
}

/// Durable content-addressed file storage.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Persist `bytes` at `storage_path`. Returns only once the file is
    /// durable; a failed write leaves nothing behind.
    async fn store(&self, storage_path: &str, bytes: &[u8]) -> Result<StoredFile, StorageError>;

    async fn read(&self, storage_path: &str) -> Result<Vec<u8>, StorageError>;
}

/// Ledger submission of an evidence hash.
#[async_trait]
pub trait AnchorSubmitter: Send + Sync {
    /// Reserve a ticket for `file_hash` and schedule its broadcast.
    /// Must not wait for confirmation.
    async fn submit_anchor(
        &self,
        complaint_id: &ComplaintId,
        file_hash: Hash,
    ) -> Result<Ticket, LedgerError>;
}
