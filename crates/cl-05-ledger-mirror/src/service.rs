//! # Ledger Mirror Service
//!
//! Arena-style table: one `ComplaintLog` per complaint in a `DashMap`, plus
//! ticket and payload-hash indexes pointing at `(complaint, seq)`.
//!
//! Lock order is always `logs` → index. Index lookups are copied out before
//! a log is locked, so no two guards are ever taken in the reverse order.

use crate::domain::{project_ticket, rebind, ComplaintLog, MirrorConfig, ReconcileReport};
use crate::error::{MirrorError, MirrorResult};
use crate::ports::inbound::LedgerMirrorApi;
use crate::ports::outbound::ReceiptSource;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{
    to_hex, ComplaintEvent, ComplaintId, Hash, SubmissionStatus, Ticket, TicketId, Timestamp,
};
use tracing::{debug, info, warn};

type EventRef = (ComplaintId, u64);

pub struct LedgerMirror {
    config: MirrorConfig,
    logs: DashMap<ComplaintId, ComplaintLog>,
    by_ticket: DashMap<TicketId, EventRef>,
    by_payload: DashMap<Hash, EventRef>,
}

impl LedgerMirror {
    pub fn new(config: MirrorConfig) -> Self {
        Self {
            config,
            logs: DashMap::new(),
            by_ticket: DashMap::new(),
            by_payload: DashMap::new(),
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Total number of mirrored events.
    pub fn event_count(&self) -> usize {
        self.logs.iter().map(|log| log.len()).sum()
    }

    /// Append `event`, then run `then` while the complaint's log is still
    /// locked. Work `then` schedules is ordered like `seq`.
    ///
    /// If `then` fails the event stays appended.
    pub fn append_then<T, E, F>(
        &self,
        event: ComplaintEvent,
        then: F,
    ) -> Result<(ComplaintEvent, T), E>
    where
        F: FnOnce(&ComplaintEvent) -> Result<T, E>,
        E: From<MirrorError>,
    {
        let complaint_id = event.complaint_id.clone();
        let mut log = self.logs.entry(complaint_id.clone()).or_default();

        let stored = match self.by_ticket.entry(event.ticket_id) {
            Entry::Occupied(existing) => {
                return Err(MirrorError::DuplicateTicket {
                    ticket_id: *existing.key(),
                    complaint_id: existing.get().0.clone(),
                }
                .into());
            }
            Entry::Vacant(slot) => {
                let stored = log.append(event);
                slot.insert((complaint_id.clone(), stored.seq));
                stored
            }
        };
        self.by_payload
            .entry(stored.payload_hash)
            .or_insert_with(|| (complaint_id.clone(), stored.seq));

        debug!(
            complaint_id = %complaint_id,
            seq = stored.seq,
            event_type = %stored.event_type,
            ticket_id = %stored.ticket_id,
            "Event mirrored"
        );
        let output = then(&stored)?;
        drop(log);
        Ok((stored, output))
    }

    fn lookup(&self, event_ref: &EventRef) -> Option<ComplaintEvent> {
        let (complaint_id, seq) = event_ref;
        self.logs.get(complaint_id)?.get(*seq).cloned()
    }
}

impl Default for LedgerMirror {
    fn default() -> Self {
        Self::new(MirrorConfig::default())
    }
}

#[async_trait]
impl LedgerMirrorApi for LedgerMirror {
    fn append(&self, event: ComplaintEvent) -> MirrorResult<ComplaintEvent> {
        self.append_then(event, |_| Ok::<_, MirrorError>(()))
            .map(|(stored, ())| stored)
    }

    fn apply_ticket(&self, ticket: &Ticket) -> Option<ComplaintEvent> {
        let (complaint_id, seq) = self.by_ticket.get(&ticket.id).map(|r| r.clone())?;
        let mut log = self.logs.get_mut(&complaint_id)?;
        let event = log.get_mut(seq)?;
        if !project_ticket(event, ticket) {
            return None;
        }
        debug!(
            complaint_id = %complaint_id,
            seq,
            status = %event.status,
            "Mirrored event status updated"
        );
        Some(event.clone())
    }

    fn rebind_ticket(&self, failed: TicketId, ticket: &Ticket) -> MirrorResult<ComplaintEvent> {
        let (complaint_id, seq) = self
            .by_ticket
            .get(&failed)
            .map(|r| r.clone())
            .ok_or(MirrorError::UnknownTicket(failed))?;
        let mut log = self
            .logs
            .get_mut(&complaint_id)
            .ok_or(MirrorError::UnknownTicket(failed))?;
        let event = log.get_mut(seq).ok_or(MirrorError::UnknownTicket(failed))?;

        if event.status != SubmissionStatus::Failed {
            return Err(MirrorError::NotFailed {
                ticket_id: failed,
                status: event.status,
            });
        }
        match self.by_ticket.entry(ticket.id) {
            Entry::Occupied(_) => {
                return Err(MirrorError::DuplicateTicket {
                    ticket_id: ticket.id,
                    complaint_id,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert((complaint_id.clone(), seq));
            }
        }

        rebind(event, ticket);
        let rebound = event.clone();
        drop(log);
        self.by_ticket.remove(&failed);

        info!(
            complaint_id = %complaint_id,
            seq,
            previous = %failed,
            ticket_id = %ticket.id,
            "Failed event rebound to resubmission"
        );
        Ok(rebound)
    }

    fn query_events(&self, complaint_id: &ComplaintId) -> Vec<ComplaintEvent> {
        self.logs
            .get(complaint_id)
            .map(|log| log.events().to_vec())
            .unwrap_or_default()
    }

    fn confirmed_events(&self, complaint_id: &ComplaintId) -> Vec<ComplaintEvent> {
        self.logs
            .get(complaint_id)
            .map(|log| {
                log.events()
                    .iter()
                    .filter(|e| e.status == SubmissionStatus::Confirmed)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_by_payload_hash(&self, payload_hash: &Hash) -> Option<ComplaintEvent> {
        let event_ref = self.by_payload.get(payload_hash).map(|r| r.clone())?;
        self.lookup(&event_ref)
    }

    fn find_event(
        &self,
        complaint_id: &ComplaintId,
        payload_hash: &Hash,
    ) -> Option<ComplaintEvent> {
        self.find_by_payload_hash(payload_hash)
            .filter(|event| &event.complaint_id == complaint_id)
    }

    fn event_for_ticket(&self, ticket_id: &TicketId) -> Option<ComplaintEvent> {
        let event_ref = self.by_ticket.get(ticket_id).map(|r| r.clone())?;
        self.lookup(&event_ref)
    }

    fn stale_submitted(&self, now: Timestamp, stale_after: u64) -> Vec<ComplaintEvent> {
        let mut stale: Vec<ComplaintEvent> = self
            .logs
            .iter()
            .flat_map(|log| {
                log.events()
                    .iter()
                    .filter(|e| {
                        e.status == SubmissionStatus::Submitted
                            && now.saturating_sub(e.submitted_at.unwrap_or(e.created_at))
                                >= stale_after
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        stale.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.complaint_id.cmp(&b.complaint_id))
                .then_with(|| a.seq.cmp(&b.seq))
        });
        stale
    }

    async fn reconcile(&self, source: &dyn ReceiptSource, now: Timestamp) -> ReconcileReport {
        let mut report = ReconcileReport::new();
        let stale = self.stale_submitted(now, self.config.stale_after_secs);

        for event in stale.into_iter().take(self.config.reconcile_batch) {
            match source.refresh(event.ticket_id).await {
                Ok(ticket) => {
                    let status = self
                        .apply_ticket(&ticket)
                        .map(|e| e.status)
                        .unwrap_or(event.status);
                    report.record(status);
                }
                Err(e) => {
                    warn!(
                        complaint_id = %event.complaint_id,
                        seq = event.seq,
                        tx_hash = ?event.tx_hash.as_ref().map(|h| to_hex(h)),
                        error = %e,
                        "Receipt refresh failed"
                    );
                    report.add_error(event.ticket_id, e.to_string());
                }
            }
        }

        if report.checked > 0 {
            info!(
                checked = report.checked,
                confirmed = report.confirmed,
                failed = report.failed,
                still_submitted = report.still_submitted,
                errors = report.errors.len(),
                "Mirror reconciliation pass"
            );
        }
        report
    }
}
