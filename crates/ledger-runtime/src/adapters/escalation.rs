//! SLA tracker outbound port: deadline anchoring and escalation recording.

use crate::adapters::pipeline::SubmissionPipeline;
use async_trait::async_trait;
use cl_01_event_encoder::{canonical_hash, EventEncoderApi, EventEncoderService};
use cl_04_sla_tracker::EscalationSink;
use serde_json::json;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{
    EventType, Hash, LedgerError, SlaDeadline, TicketId, TicketKind, TicketMetadata,
};
use std::sync::Arc;
use tracing::warn;

pub struct LedgerEscalationSink {
    encoder: EventEncoderService,
    pipeline: Arc<SubmissionPipeline>,
    publisher: Arc<dyn EventPublisher>,
}

impl LedgerEscalationSink {
    pub fn new(pipeline: Arc<SubmissionPipeline>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            encoder: EventEncoderService::new(),
            pipeline,
            publisher,
        }
    }
}

/// Payload anchored for a deadline. One per (complaint, deadline) pair.
pub fn deadline_anchor_hash(deadline: &SlaDeadline) -> Hash {
    canonical_hash(&json!({
        "complaint_id": deadline.complaint_id.as_str(),
        "deadline_ts": deadline.deadline_ts,
        "kind": TicketKind::SlaDeadline.label(),
    }))
}

#[async_trait]
impl EscalationSink for LedgerEscalationSink {
    async fn deadline_set(&self, deadline: &SlaDeadline) -> Result<TicketId, LedgerError> {
        let ticket = self.pipeline.submit_anchor(
            deadline_anchor_hash(deadline),
            TicketMetadata::new(deadline.complaint_id.clone(), TicketKind::SlaDeadline),
        )?;
        Ok(ticket.id)
    }

    async fn escalated(&self, deadline: &SlaDeadline) -> Result<(), LedgerError> {
        let escalated_at = deadline.escalated_at.unwrap_or(deadline.deadline_ts);

        // Published whether or not the ledger write can be scheduled.
        self.publisher
            .publish(LedgerEvent::ComplaintEscalated {
                complaint_id: deadline.complaint_id.clone(),
                deadline_ts: deadline.deadline_ts,
                escalated_at,
            })
            .await;

        let encoded = self.encoder.encode_typed(
            &deadline.complaint_id,
            EventType::Escalated,
            &json!({
                "deadline_ts": deadline.deadline_ts,
                "escalated_at": escalated_at,
                "reason": "sla_deadline_exceeded",
            }),
            escalated_at,
        )?;
        self.pipeline.submit_event(&encoded).map(|_| ()).map_err(|e| {
            warn!(
                complaint_id = %deadline.complaint_id,
                error = %e,
                "Escalation event could not be scheduled"
            );
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ComplaintId;

    fn deadline(ts: u64) -> SlaDeadline {
        SlaDeadline {
            complaint_id: ComplaintId::parse("RT000001").unwrap(),
            deadline_ts: ts,
            escalated: false,
            escalated_at: None,
            extensions: 0,
            anchor_ticket: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_deadline_hash_tracks_timestamp() {
        assert_eq!(deadline_anchor_hash(&deadline(10)), deadline_anchor_hash(&deadline(10)));
        assert_ne!(deadline_anchor_hash(&deadline(10)), deadline_anchor_hash(&deadline(11)));
    }

    #[test]
    fn test_deadline_hash_ignores_escalation_state() {
        let mut escalated = deadline(10);
        escalated.escalated = true;
        escalated.escalated_at = Some(12);
        assert_eq!(deadline_anchor_hash(&escalated), deadline_anchor_hash(&deadline(10)));
    }
}
