//! Request-path side of ledger submission.
//!
//! Every write reaches the ledger the same way:
//!
//! ```text
//! reserve(payload_hash) ──→ [mirror append ──→ queue.enqueue] ──→ (worker) broadcast
//! ```
//!
//! The bracketed steps run under the complaint's log lock. A payload whose
//! earlier ticket FAILED gets a fresh ticket and keeps its mirrored event.
//!
//! Nothing here waits for the network. A reserved ticket that is still
//! PENDING is enqueued again on a duplicate request; the submitter ignores a
//! broadcast of a ticket that already left PENDING.

use cl_01_event_encoder::EncodedEvent;
use cl_02_tx_submitter::{Reservation, TransactionSubmitter, TransactionSubmitterApi};
use cl_05_ledger_mirror::{LedgerMirror, LedgerMirrorApi};
use cl_06_submission_queue::{QueueError, SubmissionQueue, SubmissionQueueApi, SubmissionTask};
use shared_types::{
    to_hex, ComplaintEvent, Hash, LedgerError, LedgerResult, SubmissionStatus, Ticket,
    TicketKind, TicketMetadata,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SubmissionPipeline {
    submitter: Arc<TransactionSubmitter>,
    mirror: Arc<LedgerMirror>,
    queue: SubmissionQueue,
}

impl SubmissionPipeline {
    pub fn new(
        submitter: Arc<TransactionSubmitter>,
        mirror: Arc<LedgerMirror>,
        queue: SubmissionQueue,
    ) -> Self {
        Self {
            submitter,
            mirror,
            queue,
        }
    }

    /// Reserve a ticket for an encoded event, record it in the mirror and
    /// schedule its broadcast. A duplicate returns the existing ticket.
    pub fn submit_event(&self, encoded: &EncodedEvent) -> LedgerResult<Ticket> {
        self.ensure_open()?;
        let metadata = TicketMetadata::new(
            encoded.complaint_id.clone(),
            TicketKind::Event(encoded.event_type),
        );
        match self.submitter.reserve(encoded.hash, metadata) {
            Reservation::Existing(ticket) => {
                debug!(
                    ticket_id = %ticket.id,
                    complaint_id = %encoded.complaint_id,
                    status = %ticket.status,
                    "Duplicate event, returning existing ticket"
                );
                self.requeue_if_pending(&ticket)?;
                Ok(ticket)
            }
            Reservation::New(ticket) => {
                if let Some(failed) = self.failed_predecessor(encoded) {
                    self.rebind_failed(&failed, &ticket)?;
                    self.enqueue(&ticket)?;
                    info!(
                        failed = %failed.id,
                        ticket_id = %ticket.id,
                        complaint_id = %encoded.complaint_id,
                        "Failed event submitted again"
                    );
                    return Ok(ticket);
                }
                let event = ComplaintEvent::pending(
                    encoded.complaint_id.clone(),
                    encoded.event_type,
                    encoded.hash,
                    ticket.id,
                    ticket.created_at,
                );
                // Enqueued under the complaint's log so lane order is seq order.
                let (event, ()) = self
                    .mirror
                    .append_then(event, |_| self.enqueue(&ticket))?;
                info!(
                    complaint_id = %event.complaint_id,
                    seq = event.seq,
                    event_type = %event.event_type,
                    ticket_id = %ticket.id,
                    payload_hash = %encoded.hash_hex(),
                    "Event accepted"
                );
                Ok(ticket)
            }
        }
    }

    /// Reserve and schedule a ticket that has no mirrored event.
    pub fn submit_anchor(&self, payload_hash: Hash, metadata: TicketMetadata) -> LedgerResult<Ticket> {
        self.ensure_open()?;
        let reservation = self.submitter.reserve(payload_hash, metadata);
        if !reservation.is_new() {
            debug!(
                payload_hash = %to_hex(&payload_hash),
                ticket_id = %reservation.ticket().id,
                "Anchor already reserved"
            );
        }
        let ticket = reservation.into_ticket();
        self.requeue_if_pending(&ticket)?;
        Ok(ticket)
    }

    /// Replace a FAILED ticket with a fresh one for the same payload and
    /// move its mirrored event, if any, onto the new ticket.
    pub fn resubmit(&self, failed: &Ticket) -> LedgerResult<Ticket> {
        if failed.status != SubmissionStatus::Failed {
            return Err(LedgerError::Validation(format!(
                "ticket {} is {}, only FAILED tickets can be resubmitted",
                failed.id, failed.status
            )));
        }
        self.ensure_open()?;

        let ticket = match self
            .submitter
            .reserve(failed.payload_hash, failed.metadata.clone())
        {
            Reservation::New(ticket) => ticket,
            Reservation::Existing(ticket) => {
                debug!(
                    failed = %failed.id,
                    ticket_id = %ticket.id,
                    "Payload already resubmitted"
                );
                return Ok(ticket);
            }
        };

        if matches!(failed.metadata.kind, TicketKind::Event(_)) {
            self.rebind_failed(failed, &ticket)?;
        }
        self.enqueue(&ticket)?;
        info!(
            failed = %failed.id,
            ticket_id = %ticket.id,
            complaint_id = %ticket.complaint_id(),
            "Failed ticket resubmitted"
        );
        Ok(ticket)
    }

    /// FAILED ticket behind the complaint's event for this payload.
    fn failed_predecessor(&self, encoded: &EncodedEvent) -> Option<Ticket> {
        let event = self.mirror.find_event(&encoded.complaint_id, &encoded.hash)?;
        let previous = self.submitter.ticket(&event.ticket_id)?;
        (previous.status == SubmissionStatus::Failed).then_some(previous)
    }

    fn rebind_failed(&self, failed: &Ticket, ticket: &Ticket) -> LedgerResult<()> {
        // The FAILED transition may not have reached the mirror yet.
        self.mirror.apply_ticket(failed);
        self.mirror.rebind_ticket(failed.id, ticket)?;
        Ok(())
    }

    fn ensure_open(&self) -> LedgerResult<()> {
        if self.queue.is_closed() {
            return Err(QueueError::Closed.into());
        }
        Ok(())
    }

    fn requeue_if_pending(&self, ticket: &Ticket) -> LedgerResult<()> {
        if ticket.status == SubmissionStatus::Pending {
            self.enqueue(ticket)?;
        }
        Ok(())
    }

    fn enqueue(&self, ticket: &Ticket) -> LedgerResult<()> {
        self.queue
            .enqueue(SubmissionTask::new(
                ticket.complaint_id().clone(),
                ticket.id,
                ticket.metadata.kind,
            ))
            .map_err(LedgerError::from)
    }
}
