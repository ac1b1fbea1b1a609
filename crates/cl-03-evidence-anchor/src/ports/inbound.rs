//! Inbound port: the evidence anchoring API.

use crate::domain::EvidenceMetadata;
use crate::error::EvidenceResult;
use async_trait::async_trait;
use shared_types::{ComplaintId, EvidenceRecord, Hash, Ticket};

#[async_trait]
pub trait EvidenceAnchorApi: Send + Sync {
    /// Store and anchor a file. Re-anchoring identical content for the same
    /// complaint returns the existing record without touching the ledger.
    async fn anchor(&self, complaint_id: &ComplaintId, bytes: &[u8])
        -> EvidenceResult<EvidenceRecord>;

    async fn anchor_with_metadata(
        &self,
        complaint_id: &ComplaintId,
        bytes: &[u8],
        metadata: EvidenceMetadata,
    ) -> EvidenceResult<EvidenceRecord>;

    /// Check a presented file against its anchored record and stored copy.
    async fn verify(&self, complaint_id: &ComplaintId, bytes: &[u8])
        -> EvidenceResult<EvidenceRecord>;

    /// Mirror a ticket's status into the record it anchors, if any.
    async fn apply_ticket(&self, ticket: &Ticket) -> Option<EvidenceRecord>;

    fn record(&self, complaint_id: &ComplaintId, file_hash: &Hash) -> Option<EvidenceRecord>;

    /// Every record of a complaint, oldest first.
    fn records(&self, complaint_id: &ComplaintId) -> Vec<EvidenceRecord>;
}
