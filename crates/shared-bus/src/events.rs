//! # Ledger Events
//!
//! Every event that flows through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{ComplaintId, EvidenceRecord, Ticket, Timestamp};

/// Status events published by the ledger components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // TRANSACTION SUBMITTER
    // =========================================================================
    /// A ticket was broadcast (or re-broadcast with a bumped fee).
    TicketSubmitted(Ticket),

    /// A ticket reached the configured confirmation depth.
    TicketConfirmed(Ticket),

    /// A ticket reached FAILED. Never retried automatically.
    TicketFailed(Ticket),

    // =========================================================================
    // SLA TRACKER
    // =========================================================================
    /// A complaint passed its deadline and was escalated.
    ComplaintEscalated {
        complaint_id: ComplaintId,
        deadline_ts: Timestamp,
        escalated_at: Timestamp,
    },

    // =========================================================================
    // EVIDENCE ANCHOR
    // =========================================================================
    /// An evidence record was confirmed on the ledger.
    EvidenceAnchored(EvidenceRecord),
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TicketSubmitted(_) | Self::TicketConfirmed(_) | Self::TicketFailed(_) => {
                EventTopic::Tickets
            }
            Self::ComplaintEscalated { .. } => EventTopic::Sla,
            Self::EvidenceAnchored(_) => EventTopic::Evidence,
        }
    }

    /// The complaint this event concerns.
    #[must_use]
    pub fn complaint_id(&self) -> &ComplaintId {
        match self {
            Self::TicketSubmitted(ticket)
            | Self::TicketConfirmed(ticket)
            | Self::TicketFailed(ticket) => ticket.complaint_id(),
            Self::ComplaintEscalated { complaint_id, .. } => complaint_id,
            Self::EvidenceAnchored(record) => &record.complaint_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Ticket lifecycle transitions.
    Tickets,
    /// Deadline escalations.
    Sla,
    /// Evidence anchoring.
    Evidence,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Complaints to include. Empty means every complaint.
    pub complaints: Vec<ComplaintId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            complaints: Vec::new(),
        }
    }

    /// Create a filter for events about one complaint.
    #[must_use]
    pub fn complaint(complaint_id: ComplaintId) -> Self {
        Self {
            topics: Vec::new(),
            complaints: vec![complaint_id],
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let complaint_match =
            self.complaints.is_empty() || self.complaints.contains(event.complaint_id());

        topic_match && complaint_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{TicketKind, TicketMetadata};

    fn ticket(id: &str) -> Ticket {
        Ticket::pending(
            [7u8; 32],
            TicketMetadata::new(ComplaintId::parse(id).unwrap(), TicketKind::Evidence),
            10,
        )
    }

    fn escalation(id: &str) -> LedgerEvent {
        LedgerEvent::ComplaintEscalated {
            complaint_id: ComplaintId::parse(id).unwrap(),
            deadline_ts: 100,
            escalated_at: 101,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(
            LedgerEvent::TicketConfirmed(ticket("RT1")).topic(),
            EventTopic::Tickets
        );
        assert_eq!(escalation("RT1").topic(), EventTopic::Sla);
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&LedgerEvent::TicketFailed(ticket("RT1"))));
        assert!(filter.matches(&escalation("RT2")));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Sla]);
        assert!(filter.matches(&escalation("RT1")));
        assert!(!filter.matches(&LedgerEvent::TicketSubmitted(ticket("RT1"))));
    }

    #[test]
    fn test_filter_by_complaint() {
        let filter = EventFilter::complaint(ComplaintId::parse("RT1").unwrap());
        assert!(filter.matches(&LedgerEvent::TicketSubmitted(ticket("RT1"))));
        assert!(!filter.matches(&LedgerEvent::TicketSubmitted(ticket("RT2"))));
    }
}
