//! # Evidence Anchor Service
//!
//! Implements `EvidenceAnchorApi`.
//!
//! ## Locking
//!
//! | State | Guard | Held across |
//! |-------|-------|-------------|
//! | records / ticket index | `DashMap` shard lock | never across an `.await` |
//! | one (complaint, hash) | per-key `tokio::sync::Mutex` | store → submit |
//!
//! The per-key lock makes concurrent anchors of identical content produce a
//! single ledger transaction. Lock entries are dropped once unused.

use crate::domain::{content_hash, storage_path, EvidenceMetadata};
use crate::error::{EvidenceError, EvidenceResult};
use crate::ports::inbound::EvidenceAnchorApi;
use crate::ports::outbound::{AnchorSubmitter, EvidenceStore};
use async_trait::async_trait;
use dashmap::DashMap;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{
    to_hex, ComplaintId, EvidenceRecord, Hash, SubmissionStatus, Ticket, TicketId, TimeSource,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

type EvidenceKey = (ComplaintId, Hash);

/// Content-addressed evidence storage anchored through the submitter.
pub struct EvidenceAnchor {
    store: Arc<dyn EvidenceStore>,
    submitter: Arc<dyn AnchorSubmitter>,
    clock: Arc<dyn TimeSource>,
    publisher: Arc<dyn EventPublisher>,
    records: DashMap<EvidenceKey, EvidenceRecord>,
    by_ticket: DashMap<TicketId, EvidenceKey>,
    key_locks: DashMap<EvidenceKey, Arc<Mutex<()>>>,
}

impl EvidenceAnchor {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        submitter: Arc<dyn AnchorSubmitter>,
        clock: Arc<dyn TimeSource>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            submitter,
            clock,
            publisher,
            records: DashMap::new(),
            by_ticket: DashMap::new(),
            key_locks: DashMap::new(),
        }
    }

    /// Number of records across all complaints.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A live record that makes re-anchoring unnecessary.
    fn reusable(&self, key: &EvidenceKey) -> Option<EvidenceRecord> {
        self.records
            .get(key)
            .filter(|r| r.status != SubmissionStatus::Failed)
            .map(|r| r.clone())
    }

    fn key_lock(&self, key: &EvidenceKey) -> Arc<Mutex<()>> {
        self.key_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_key_lock(&self, key: &EvidenceKey, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.key_locks.remove_if(key, |_, l| Arc::strong_count(l) == 1);
    }

    async fn anchor_locked(
        &self,
        key: &EvidenceKey,
        bytes: &[u8],
        metadata: EvidenceMetadata,
    ) -> EvidenceResult<EvidenceRecord> {
        if let Some(existing) = self.reusable(key) {
            return Ok(existing);
        }
        let (complaint_id, file_hash) = key;
        let path = storage_path(complaint_id, file_hash);

        let stored = self.store.store(&path, bytes).await.map_err(|e| {
            error!(complaint_id = %complaint_id, path = %path, error = %e, "Evidence storage failed");
            EvidenceError::from(e)
        })?;

        let ticket = self
            .submitter
            .submit_anchor(complaint_id, *file_hash)
            .await
            .map_err(|e| {
                warn!(complaint_id = %complaint_id, error = %e, "Evidence anchor submission failed");
                EvidenceError::Submission(e)
            })?;

        let record = EvidenceRecord {
            complaint_id: complaint_id.clone(),
            file_hash: *file_hash,
            storage_path: stored.storage_path,
            ticket_id: ticket.id,
            tx_hash: ticket.tx_hash,
            status: SubmissionStatus::Pending,
            created_at: self.clock.now(),
            anchored_at: None,
            file_size: stored.size,
            file_name: metadata.file_name,
            content_type: metadata.content_type,
            verified: false,
        };

        self.by_ticket.insert(ticket.id, key.clone());
        self.records.insert(key.clone(), record.clone());
        info!(
            complaint_id = %complaint_id,
            file_hash = %to_hex(file_hash),
            ticket_id = %ticket.id,
            size = record.file_size,
            "Evidence stored and anchor submitted"
        );

        // The submitter may hand back a ticket that already progressed.
        if ticket.status != SubmissionStatus::Pending {
            if let Some(updated) = self.apply_ticket(&ticket).await {
                return Ok(updated);
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl EvidenceAnchorApi for EvidenceAnchor {
    async fn anchor(
        &self,
        complaint_id: &ComplaintId,
        bytes: &[u8],
    ) -> EvidenceResult<EvidenceRecord> {
        self.anchor_with_metadata(complaint_id, bytes, EvidenceMetadata::default())
            .await
    }

    async fn anchor_with_metadata(
        &self,
        complaint_id: &ComplaintId,
        bytes: &[u8],
        metadata: EvidenceMetadata,
    ) -> EvidenceResult<EvidenceRecord> {
        if bytes.is_empty() {
            return Err(EvidenceError::EmptyFile);
        }
        let key = (complaint_id.clone(), content_hash(bytes));

        if let Some(existing) = self.reusable(&key) {
            debug!(
                complaint_id = %complaint_id,
                file_hash = %to_hex(&key.1),
                "Evidence already anchored"
            );
            return Ok(existing);
        }

        let lock = self.key_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            self.anchor_locked(&key, bytes, metadata).await
        };
        self.release_key_lock(&key, lock);
        result
    }

    async fn verify(
        &self,
        complaint_id: &ComplaintId,
        bytes: &[u8],
    ) -> EvidenceResult<EvidenceRecord> {
        let file_hash = content_hash(bytes);
        let key = (complaint_id.clone(), file_hash);

        let record = self
            .records
            .get(&key)
            .map(|r| r.clone())
            .ok_or_else(|| EvidenceError::NotAnchored {
                complaint_id: complaint_id.clone(),
                file_hash,
            })?;

        if record.status != SubmissionStatus::Confirmed {
            return Err(EvidenceError::NotConfirmed {
                complaint_id: complaint_id.clone(),
                status: record.status,
            });
        }

        let stored = self.store.read(&record.storage_path).await?;
        let actual = content_hash(&stored);
        if actual != record.file_hash {
            error!(
                complaint_id = %complaint_id,
                path = %record.storage_path,
                expected = %to_hex(&record.file_hash),
                actual = %to_hex(&actual),
                "Stored evidence does not match its anchor"
            );
            return Err(EvidenceError::Integrity {
                storage_path: record.storage_path,
                expected: record.file_hash,
                actual,
            });
        }

        let verified = match self.records.get_mut(&key) {
            Some(mut entry) => {
                entry.verified = true;
                entry.clone()
            }
            None => record,
        };
        info!(complaint_id = %complaint_id, file_hash = %to_hex(&file_hash), "Evidence verified");
        Ok(verified)
    }

    async fn apply_ticket(&self, ticket: &Ticket) -> Option<EvidenceRecord> {
        let key = self.by_ticket.get(&ticket.id).map(|k| k.clone())?;

        let (updated, newly_confirmed) = {
            let mut entry = self.records.get_mut(&key)?;
            // A re-anchor after failure points the record at a newer ticket.
            if entry.ticket_id != ticket.id || ticket.status.rank() <= entry.status.rank() {
                return None;
            }
            entry.status = ticket.status;
            entry.tx_hash = ticket.tx_hash;
            let newly_confirmed = ticket.status == SubmissionStatus::Confirmed;
            if newly_confirmed {
                entry.anchored_at = ticket.confirmed_at.or_else(|| Some(self.clock.now()));
            }
            (entry.clone(), newly_confirmed)
        };

        debug!(
            complaint_id = %updated.complaint_id,
            ticket_id = %ticket.id,
            status = %updated.status,
            "Evidence record updated"
        );
        if newly_confirmed {
            self.publisher
                .publish(LedgerEvent::EvidenceAnchored(updated.clone()))
                .await;
        }
        Some(updated)
    }

    fn record(&self, complaint_id: &ComplaintId, file_hash: &Hash) -> Option<EvidenceRecord> {
        self.records
            .get(&(complaint_id.clone(), *file_hash))
            .map(|r| r.clone())
    }

    fn records(&self, complaint_id: &ComplaintId) -> Vec<EvidenceRecord> {
        let mut records: Vec<EvidenceRecord> = self
            .records
            .iter()
            .filter(|r| &r.key().0 == complaint_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.storage_path.cmp(&b.storage_path))
        });
        records
    }
}
