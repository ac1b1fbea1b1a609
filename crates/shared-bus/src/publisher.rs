//! # Event Publisher
//!
//! Components publish through [`EventPublisher`]; the runtime owns the
//! concrete [`InMemoryEventBus`].

use crate::events::{EventFilter, EventTopic, LedgerEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`, returning how many subscriptions were live.
    ///
    /// Publishing never fails. An event nobody listens to is counted and
    /// dropped.
    async fn publish(&self, event: LedgerEvent) -> usize;
}

/// Counters for one bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub tickets_published: u64,
    pub sla_published: u64,
    pub evidence_published: u64,
    /// Events published while no subscription was live.
    pub unobserved: u64,
    pub subscribers: usize,
}

impl BusStats {
    pub fn total_published(&self) -> u64 {
        self.tickets_published + self.sla_published + self.evidence_published
    }
}

/// `tokio::sync::broadcast` backed bus. Filtering happens on the receiving
/// side, so every live subscription counts as a receiver.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LedgerEvent>,
    tickets: AtomicU64,
    sla: AtomicU64,
    evidence: AtomicU64,
    unobserved: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus whose subscribers lag after `capacity` unread events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            tickets: AtomicU64::new(0),
            sla: AtomicU64::new(0),
            evidence: AtomicU64::new(0),
            unobserved: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(
            topics = ?filter.topics,
            complaints = filter.complaints.len(),
            "Ledger event subscription opened"
        );
        Subscription::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            tickets_published: self.tickets.load(Ordering::Relaxed),
            sla_published: self.sla.load(Ordering::Relaxed),
            evidence_published: self.evidence.load(Ordering::Relaxed),
            unobserved: self.unobserved.load(Ordering::Relaxed),
            subscribers: self.subscriber_count(),
        }
    }

    fn counter(&self, topic: EventTopic) -> Option<&AtomicU64> {
        match topic {
            EventTopic::Tickets => Some(&self.tickets),
            EventTopic::Sla => Some(&self.sla),
            EventTopic::Evidence => Some(&self.evidence),
            EventTopic::All => None,
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        let topic = event.topic();
        if let Some(counter) = self.counter(topic) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        let complaint_id = event.complaint_id().clone();

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(?topic, complaint_id = %complaint_id, receivers, "Ledger event published");
                receivers
            }
            Err(_) => {
                self.unobserved.fetch_add(1, Ordering::Relaxed);
                trace!(?topic, complaint_id = %complaint_id, "Ledger event unobserved");
                0
            }
        }
    }
}

/// Discards every event. For components wired without a bus.
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: LedgerEvent) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ComplaintId;

    fn escalation() -> LedgerEvent {
        LedgerEvent::ComplaintEscalated {
            complaint_id: ComplaintId::parse("RT000001").unwrap(),
            deadline_ts: 10,
            escalated_at: 11,
        }
    }

    #[tokio::test]
    async fn test_unobserved_events_are_counted() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(escalation()).await, 0);

        let stats = bus.stats();
        assert_eq!(stats.sla_published, 1);
        assert_eq!(stats.unobserved, 1);
        assert_eq!(stats.total_published(), 1);
    }

    #[tokio::test]
    async fn test_every_subscription_is_a_receiver() {
        let bus = InMemoryEventBus::new();
        let _all = bus.subscribe(EventFilter::all());
        let _tickets = bus.subscribe(EventFilter::topics(vec![EventTopic::Tickets]));

        assert_eq!(bus.publish(escalation()).await, 2);
        assert_eq!(bus.stats().unobserved, 0);
        assert_eq!(bus.stats().subscribers, 2);
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_counting() {
        let bus = InMemoryEventBus::new();
        {
            let _sub = bus.subscribe(EventFilter::all());
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_noop_publisher() {
        assert_eq!(NoopPublisher.publish(escalation()).await, 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(InMemoryEventBus::with_capacity(0).capacity(), 1);
        assert_eq!(InMemoryEventBus::default().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}
