//! # Complaint Ledger
//!
//! The facade the rest of the application calls. Write operations return
//! as soon as their ledger submission is scheduled; confirmation arrives
//! later through the background loops and the event bus.
//!
//! Must be used from within a Tokio runtime.

use crate::access::AccessPolicy;
use crate::container::{ConfigError, LedgerComponents, LedgerConfig};
use crate::handlers::{apply_ticket, TicketUpdateHandler};
use crate::wiring::{escalate_overdue, reconcile_once, run_escalation_job, run_reconciler};
use cl_01_event_encoder::EventEncoderApi;
use cl_02_tx_submitter::{PollReport, TransactionSubmitterApi};
use cl_03_evidence_anchor::{EvidenceAnchorApi, EvidenceMetadata};
use cl_04_sla_tracker::{SlaStatus, SlaTrackerApi};
use cl_05_ledger_mirror::{LedgerMirrorApi, ReconcileReport};
use cl_06_submission_queue::{QueueStats, SubmissionQueueApi};
use parking_lot::Mutex;
use serde_json::Value;
use shared_bus::{EventFilter, EventTopic, Subscription};
use shared_types::{
    parse_hash, ComplaintEvent, ComplaintId, EvidenceRecord, LedgerError, LedgerResult,
    SlaDeadline, SubmissionStatus, Ticket, TicketId, TicketKind, Timestamp,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const SECONDS_PER_HOUR: u64 = 3_600;

pub struct ComplaintLedger {
    components: LedgerComponents,
    access: AccessPolicy,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl ComplaintLedger {
    pub fn new(components: LedgerComponents) -> Self {
        let access = AccessPolicy::new(components.config.access.admin_principal.clone());
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            components,
            access,
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: LedgerConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(LedgerComponents::from_config(config)?))
    }

    pub fn components(&self) -> &LedgerComponents {
        &self.components
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Spawn the ticket update handler, confirmation poller, mirror
    /// reconciler and escalation scheduler. A second call does nothing.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Complaint ledger already started");
            return;
        }
        let c = &self.components;
        let scheduler = &c.config.scheduler;

        let handler = TicketUpdateHandler::new(
            c.bus.subscribe(EventFilter::topics(vec![EventTopic::Tickets])),
            c.mirror.clone(),
            c.evidence.clone(),
        );

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(handler.run(self.shutdown_tx.subscribe())));
        tasks.push(tokio::spawn(
            c.submitter.clone().run_poller(self.shutdown_tx.subscribe()),
        ));
        tasks.push(tokio::spawn(run_reconciler(
            c.mirror.clone(),
            c.receipts.clone(),
            c.clock.clone(),
            Duration::from_secs(scheduler.reconcile_interval_secs.max(1)),
            self.shutdown_tx.subscribe(),
        )));
        tasks.push(tokio::spawn(run_escalation_job(
            c.sla.clone(),
            c.clock.clone(),
            Duration::from_secs(scheduler.escalation_interval_secs.max(1)),
            c.config.sla.overdue_batch,
            self.shutdown_tx.subscribe(),
        )));
        info!(tasks = tasks.len(), "Complaint ledger started");
    }

    /// Stop accepting work, drain the queue, then stop the background loops.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown");
        self.components.queue.close();
        self.components.queue.wait_idle().await;

        self.shutdown_tx.send_replace(true);
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        info!("Shutdown complete");
    }

    /// Wait until every queued submission task ran.
    pub async fn wait_idle(&self) {
        self.components.queue.wait_idle().await;
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.components.queue.stats()
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.components.bus.subscribe(filter)
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Encode a lifecycle transition and schedule its ledger submission.
    ///
    /// Re-submitting an identical event returns the existing ticket.
    pub fn submit_event(
        &self,
        complaint_id: &str,
        event_type: &str,
        payload: &Value,
    ) -> LedgerResult<Ticket> {
        let c = &self.components;
        let encoded = c
            .encoder
            .encode(complaint_id, event_type, payload, c.clock.now())?;
        if !encoded.dropped_fields.is_empty() {
            info!(
                complaint_id = %encoded.complaint_id,
                event_type = %encoded.event_type,
                dropped = ?encoded.dropped_fields,
                "Payload fields outside the whitelist were dropped"
            );
        }
        c.pipeline.submit_event(&encoded)
    }

    /// Every mirrored event of a complaint in submission order.
    pub fn query_events(&self, complaint_id: &str) -> LedgerResult<Vec<ComplaintEvent>> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.mirror.query_events(&id))
    }

    pub fn confirmed_events(&self, complaint_id: &str) -> LedgerResult<Vec<ComplaintEvent>> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.mirror.confirmed_events(&id))
    }

    /// True when the complaint has a CONFIRMED event with this payload hash.
    ///
    /// `payload_hash` is hex, with or without `0x`.
    pub fn verify_event(&self, complaint_id: &str, payload_hash: &str) -> LedgerResult<bool> {
        let id = ComplaintId::parse(complaint_id)?;
        let hash = parse_hash(payload_hash).ok_or_else(|| {
            LedgerError::Validation(format!("malformed payload hash {payload_hash:?}"))
        })?;
        Ok(self
            .components
            .mirror
            .find_event(&id, &hash)
            .is_some_and(|event| event.status == SubmissionStatus::Confirmed))
    }

    pub fn ticket(&self, ticket_id: &TicketId) -> Option<Ticket> {
        self.components.submitter.ticket(ticket_id)
    }

    /// Schedule a fresh submission for a FAILED ticket. Admin only.
    ///
    /// Evidence is retried by anchoring the file again.
    pub fn resubmit_failed(&self, principal: &str, ticket_id: &TicketId) -> LedgerResult<Ticket> {
        self.access.check_admin(principal, "resubmit failed tickets")?;
        let failed = self
            .components
            .submitter
            .ticket(ticket_id)
            .ok_or_else(|| LedgerError::NotFound(format!("ticket {ticket_id}")))?;
        if failed.metadata.kind == TicketKind::Evidence {
            return Err(LedgerError::Validation(format!(
                "ticket {ticket_id} anchors evidence, anchor the file again instead"
            )));
        }
        self.components.pipeline.resubmit(&failed)
    }

    // =========================================================================
    // EVIDENCE
    // =========================================================================

    pub async fn anchor_evidence(
        &self,
        complaint_id: &str,
        file: &[u8],
    ) -> LedgerResult<EvidenceRecord> {
        self.anchor_evidence_with_metadata(complaint_id, file, EvidenceMetadata::default())
            .await
    }

    /// Store a file and schedule the anchoring of its hash.
    pub async fn anchor_evidence_with_metadata(
        &self,
        complaint_id: &str,
        file: &[u8],
        metadata: EvidenceMetadata,
    ) -> LedgerResult<EvidenceRecord> {
        let id = ComplaintId::parse(complaint_id)?;
        let c = &self.components;
        let record = c.evidence.anchor_with_metadata(&id, file, metadata).await?;

        // The ticket may have moved before the record was indexed.
        if let Some(ticket) = c.submitter.ticket(&record.ticket_id) {
            if ticket.status.rank() > record.status.rank() {
                if let Some(updated) = c.evidence.apply_ticket(&ticket).await {
                    return Ok(updated);
                }
            }
        }
        Ok(record)
    }

    /// Check a presented file against its anchored record.
    pub async fn verify_evidence(
        &self,
        complaint_id: &str,
        file: &[u8],
    ) -> LedgerResult<EvidenceRecord> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.evidence.verify(&id, file).await?)
    }

    pub fn evidence_records(&self, complaint_id: &str) -> LedgerResult<Vec<EvidenceRecord>> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.evidence.records(&id))
    }

    // =========================================================================
    // SLA
    // =========================================================================

    pub async fn set_sla_deadline(
        &self,
        complaint_id: &str,
        deadline_ts: Timestamp,
    ) -> LedgerResult<SlaDeadline> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.sla.set_deadline(&id, deadline_ts).await?)
    }

    /// Deadline `default_sla_hours` from now.
    pub async fn set_default_sla_deadline(&self, complaint_id: &str) -> LedgerResult<SlaDeadline> {
        let c = &self.components;
        let hours = c.config.sla.default_sla_hours;
        let deadline = c
            .clock
            .now()
            .saturating_add(hours.saturating_mul(SECONDS_PER_HOUR));
        self.set_sla_deadline(complaint_id, deadline).await
    }

    /// Move an existing deadline later. Admin only.
    pub async fn extend_sla_deadline(
        &self,
        principal: &str,
        complaint_id: &str,
        deadline_ts: Timestamp,
    ) -> LedgerResult<SlaDeadline> {
        self.access.check_admin(principal, "extend SLA deadlines")?;
        let id = ComplaintId::parse(complaint_id)?;
        let current = self
            .components
            .sla
            .deadline(&id)
            .ok_or_else(|| LedgerError::NotFound(format!("no SLA deadline for {id}")))?;
        if deadline_ts <= current.deadline_ts {
            return Err(LedgerError::Validation(format!(
                "extension to {deadline_ts} does not move deadline {} later",
                current.deadline_ts
            )));
        }
        Ok(self.components.sla.set_deadline(&id, deadline_ts).await?)
    }

    /// Escalate the complaint if its deadline passed. True only on the
    /// transition.
    pub async fn check_escalation(&self, complaint_id: &str) -> LedgerResult<bool> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.sla.check_escalation(&id).await)
    }

    /// Check each complaint independently. Malformed, unknown and already
    /// escalated ids are skipped. Returns how many transitioned.
    pub async fn batch_check_escalation<S: AsRef<str> + Sync>(&self, complaint_ids: &[S]) -> usize {
        let ids: Vec<ComplaintId> = complaint_ids
            .iter()
            .filter_map(|raw| match ComplaintId::parse(raw.as_ref()) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(complaint_id = raw.as_ref(), error = %e, "Skipping malformed complaint id");
                    None
                }
            })
            .collect();
        self.components.sla.batch_check_escalation(&ids).await
    }

    pub fn sla_status(&self, complaint_id: &str) -> LedgerResult<SlaStatus> {
        let id = ComplaintId::parse(complaint_id)?;
        Ok(self.components.sla.status(&id))
    }

    /// One pass of the escalation scheduler.
    pub async fn escalate_overdue(&self, limit: usize) -> usize {
        let c = &self.components;
        escalate_overdue(&c.sla, c.clock.as_ref(), limit).await
    }

    // =========================================================================
    // BACKGROUND PASSES
    // =========================================================================

    /// One confirmation polling pass, projected onto the mirror and the
    /// evidence records.
    pub async fn poll_confirmations(&self) -> LedgerResult<PollReport> {
        let c = &self.components;
        let report = c.submitter.poll_pending().await?;
        for ticket_id in report
            .confirmed
            .iter()
            .chain(&report.replaced)
            .chain(&report.failed)
        {
            if let Some(ticket) = c.submitter.ticket(ticket_id) {
                apply_ticket(&c.mirror, &c.evidence, &ticket).await;
            }
        }
        Ok(report)
    }

    /// One reconciliation pass over stale SUBMITTED events.
    pub async fn reconcile(&self) -> ReconcileReport {
        let c = &self.components;
        reconcile_once(&c.mirror, c.receipts.as_ref(), c.clock.as_ref()).await
    }

    /// Tickets in `status`, oldest first.
    pub fn tickets_with_status(&self, status: SubmissionStatus) -> Vec<Ticket> {
        self.components.submitter.tickets_with_status(status)
    }
}
