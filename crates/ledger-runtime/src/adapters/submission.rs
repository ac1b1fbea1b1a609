//! Adapters that put the transaction submitter behind other components'
//! outbound ports.

use crate::adapters::pipeline::SubmissionPipeline;
use async_trait::async_trait;
use cl_01_event_encoder::canonical_hash;
use cl_02_tx_submitter::{TransactionSubmitter, TransactionSubmitterApi};
use cl_03_evidence_anchor::AnchorSubmitter;
use cl_05_ledger_mirror::ReceiptSource;
use cl_06_submission_queue::{SubmissionTask, TaskExecutor};
use serde_json::json;
use shared_types::{
    to_hex, ComplaintId, Hash, LedgerError, Ticket, TicketId, TicketKind, TicketMetadata,
};
use std::sync::Arc;

/// Queue worker body: broadcast the task's ticket.
pub struct BroadcastExecutor {
    submitter: Arc<TransactionSubmitter>,
}

impl BroadcastExecutor {
    pub fn new(submitter: Arc<TransactionSubmitter>) -> Self {
        Self { submitter }
    }
}

#[async_trait]
impl TaskExecutor for BroadcastExecutor {
    async fn execute(&self, task: &SubmissionTask) -> Result<(), LedgerError> {
        self.submitter.broadcast(task.ticket_id).await?;
        Ok(())
    }
}

/// Receipt refresh for mirror reconciliation.
pub struct SubmitterReceipts {
    submitter: Arc<TransactionSubmitter>,
}

impl SubmitterReceipts {
    pub fn new(submitter: Arc<TransactionSubmitter>) -> Self {
        Self { submitter }
    }
}

#[async_trait]
impl ReceiptSource for SubmitterReceipts {
    async fn refresh(&self, ticket_id: TicketId) -> Result<Ticket, LedgerError> {
        Ok(self.submitter.refresh(ticket_id).await?)
    }
}

/// Payload anchored for an evidence file.
///
/// Binds the file hash to its complaint, so the same file attached to two
/// complaints gets two tickets.
pub fn evidence_anchor_hash(complaint_id: &ComplaintId, file_hash: &Hash) -> Hash {
    canonical_hash(&json!({
        "complaint_id": complaint_id.as_str(),
        "file_hash": to_hex(file_hash),
        "kind": TicketKind::Evidence.label(),
    }))
}

/// Evidence anchoring through the shared submission pipeline.
pub struct PipelineAnchorSubmitter {
    pipeline: Arc<SubmissionPipeline>,
}

impl PipelineAnchorSubmitter {
    pub fn new(pipeline: Arc<SubmissionPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl AnchorSubmitter for PipelineAnchorSubmitter {
    async fn submit_anchor(
        &self,
        complaint_id: &ComplaintId,
        file_hash: Hash,
    ) -> Result<Ticket, LedgerError> {
        self.pipeline.submit_anchor(
            evidence_anchor_hash(complaint_id, &file_hash),
            TicketMetadata::new(complaint_id.clone(), TicketKind::Evidence),
        )
    }
}
