//! # Ticket Update Handler
//!
//! Projects submitter ticket transitions onto the component that owns the
//! anchored object.
//!
//! ```text
//! TicketSubmitted / TicketConfirmed / TicketFailed
//!     ├── kind Event(_)      → ledger mirror
//!     ├── kind Evidence      → evidence anchor
//!     └── kind SlaDeadline   → (nothing mirrored)
//! ```
//!
//! Application is forward-only on both sides, so replays and late
//! deliveries are harmless.

use cl_03_evidence_anchor::{EvidenceAnchor, EvidenceAnchorApi};
use cl_05_ledger_mirror::{LedgerMirror, LedgerMirrorApi};
use shared_bus::{LedgerEvent, Subscription};
use shared_types::{Ticket, TicketKind};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Route one ticket state to its owner.
pub async fn apply_ticket(mirror: &LedgerMirror, evidence: &EvidenceAnchor, ticket: &Ticket) {
    match ticket.metadata.kind {
        TicketKind::Event(_) => {
            if let Some(event) = mirror.apply_ticket(ticket) {
                debug!(
                    complaint_id = %event.complaint_id,
                    seq = event.seq,
                    status = %event.status,
                    "Mirror updated"
                );
            }
        }
        TicketKind::Evidence => {
            if let Some(record) = evidence.apply_ticket(ticket).await {
                debug!(
                    complaint_id = %record.complaint_id,
                    storage_path = %record.storage_path,
                    status = %record.status,
                    "Evidence record updated"
                );
            }
        }
        TicketKind::SlaDeadline => {}
    }
}

/// Handler for ticket transition events.
pub struct TicketUpdateHandler {
    subscription: Subscription,
    mirror: Arc<LedgerMirror>,
    evidence: Arc<EvidenceAnchor>,
}

impl TicketUpdateHandler {
    pub fn new(
        subscription: Subscription,
        mirror: Arc<LedgerMirror>,
        evidence: Arc<EvidenceAnchor>,
    ) -> Self {
        Self {
            subscription,
            mirror,
            evidence,
        }
    }

    /// Run the handler loop until the bus closes or `shutdown` flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Ticket update handler started");
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = self.subscription.recv() => match event {
                    Some(event) => self.handle(&event).await,
                    None => break,
                },
            }
        }
        info!("Ticket update handler stopped");
    }

    async fn handle(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::TicketSubmitted(ticket)
            | LedgerEvent::TicketConfirmed(ticket)
            | LedgerEvent::TicketFailed(ticket) => {
                apply_ticket(&self.mirror, &self.evidence, ticket).await;
            }
            LedgerEvent::ComplaintEscalated { .. } | LedgerEvent::EvidenceAnchored(_) => {}
        }
    }
}
