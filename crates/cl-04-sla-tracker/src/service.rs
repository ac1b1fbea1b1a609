//! # SLA Tracker Service
//!
//! Deadlines live in a `DashMap` keyed by complaint id. Each transition is
//! decided and applied under that complaint's entry lock, and the
//! `EscalationSink` is called only after the lock is released.
//!
//! A deadline whose anchoring failed is anchored again the next time the
//! same deadline is set.

use crate::domain::{plan_deadline, should_escalate, DeadlineChange, SlaStatus};
use crate::error::SlaResult;
use crate::ports::inbound::SlaTrackerApi;
use crate::ports::outbound::EscalationSink;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{ComplaintId, SlaDeadline, TimeSource, Timestamp};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct SlaTracker {
    sink: Arc<dyn EscalationSink>,
    clock: Arc<dyn TimeSource>,
    deadlines: DashMap<ComplaintId, SlaDeadline>,
}

impl SlaTracker {
    pub fn new(sink: Arc<dyn EscalationSink>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            sink,
            clock,
            deadlines: DashMap::new(),
        }
    }

    /// Number of complaints with a deadline.
    pub fn tracked(&self) -> usize {
        self.deadlines.len()
    }

    /// Store the change and return the resulting deadline.
    fn apply(
        &self,
        complaint_id: &ComplaintId,
        deadline_ts: Timestamp,
        now: Timestamp,
    ) -> SlaResult<(SlaDeadline, DeadlineChange)> {
        match self.deadlines.entry(complaint_id.clone()) {
            Entry::Occupied(mut entry) => {
                let change = plan_deadline(Some(entry.get()), deadline_ts, now)?;
                if let DeadlineChange::Extended { .. } = change {
                    let deadline = entry.get_mut();
                    deadline.deadline_ts = deadline_ts;
                    deadline.extensions += 1;
                    deadline.anchor_ticket = None;
                }
                Ok((entry.get().clone(), change))
            }
            Entry::Vacant(entry) => {
                let change = plan_deadline(None, deadline_ts, now)?;
                let deadline = SlaDeadline {
                    complaint_id: complaint_id.clone(),
                    deadline_ts,
                    escalated: false,
                    escalated_at: None,
                    extensions: 0,
                    anchor_ticket: None,
                    created_at: now,
                };
                entry.insert(deadline.clone());
                Ok((deadline, change))
            }
        }
    }
}

#[async_trait]
impl SlaTrackerApi for SlaTracker {
    async fn set_deadline(
        &self,
        complaint_id: &ComplaintId,
        deadline_ts: Timestamp,
    ) -> SlaResult<SlaDeadline> {
        let now = self.clock.now();
        let (mut deadline, change) = self.apply(complaint_id, deadline_ts, now).map_err(|e| {
            debug!(complaint_id = %complaint_id, deadline_ts, error = %e, "Deadline rejected");
            e
        })?;

        match change {
            DeadlineChange::Unchanged if deadline.anchor_ticket.is_some() => return Ok(deadline),
            DeadlineChange::Unchanged => {
                debug!(complaint_id = %complaint_id, deadline_ts, "Retrying deadline anchoring");
            }
            DeadlineChange::Created => {
                info!(complaint_id = %complaint_id, deadline_ts, "SLA deadline set");
            }
            DeadlineChange::Extended { previous } => {
                info!(
                    complaint_id = %complaint_id,
                    previous,
                    deadline_ts,
                    extensions = deadline.extensions,
                    "SLA deadline extended"
                );
            }
        }

        match self.sink.deadline_set(&deadline).await {
            Ok(ticket_id) => {
                if let Some(mut entry) = self.deadlines.get_mut(complaint_id) {
                    // A concurrent extension owns the newer anchor.
                    if entry.deadline_ts == deadline.deadline_ts {
                        entry.anchor_ticket = Some(ticket_id);
                        deadline = entry.clone();
                    }
                }
            }
            Err(e) => {
                warn!(complaint_id = %complaint_id, error = %e, "Deadline anchoring failed");
            }
        }
        Ok(deadline)
    }

    async fn check_escalation(&self, complaint_id: &ComplaintId) -> bool {
        let now = self.clock.now();
        let escalated = {
            let Some(mut entry) = self.deadlines.get_mut(complaint_id) else {
                return false;
            };
            if !should_escalate(&entry, now) {
                return false;
            }
            entry.escalated = true;
            entry.escalated_at = Some(now);
            entry.clone()
        };

        warn!(
            complaint_id = %complaint_id,
            deadline_ts = escalated.deadline_ts,
            overdue_secs = now - escalated.deadline_ts,
            "Complaint escalated"
        );
        if let Err(e) = self.sink.escalated(&escalated).await {
            error!(complaint_id = %complaint_id, error = %e, "Escalation could not be recorded");
        }
        true
    }

    async fn batch_check_escalation(&self, complaint_ids: &[ComplaintId]) -> usize {
        let mut count = 0;
        for complaint_id in complaint_ids {
            if self.check_escalation(complaint_id).await {
                count += 1;
            }
        }
        if count > 0 {
            info!(checked = complaint_ids.len(), escalated = count, "Batch escalation check");
        }
        count
    }

    fn overdue(&self, now: Timestamp, limit: usize) -> Vec<SlaDeadline> {
        let mut overdue: Vec<SlaDeadline> = self
            .deadlines
            .iter()
            .filter(|d| should_escalate(d.value(), now))
            .map(|d| d.value().clone())
            .collect();
        overdue.sort_by(|a, b| {
            a.deadline_ts
                .cmp(&b.deadline_ts)
                .then_with(|| a.complaint_id.cmp(&b.complaint_id))
        });
        overdue.truncate(limit);
        overdue
    }

    fn status(&self, complaint_id: &ComplaintId) -> SlaStatus {
        match self.deadlines.get(complaint_id) {
            Some(deadline) => SlaStatus::of(&deadline, self.clock.now()),
            None => SlaStatus::no_deadline(),
        }
    }

    fn deadline(&self, complaint_id: &ComplaintId) -> Option<SlaDeadline> {
        self.deadlines.get(complaint_id).map(|d| d.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlaError;
    use parking_lot::Mutex;
    use shared_types::{LedgerError, ManualTimeSource, SlaState, TicketId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSink {
        deadlines: Mutex<Vec<SlaDeadline>>,
        escalations: Mutex<Vec<SlaDeadline>>,
        fail: bool,
        /// `deadline_set` calls still to fail.
        anchor_failures: AtomicUsize,
    }

    #[async_trait]
    impl EscalationSink for RecordingSink {
        async fn deadline_set(&self, deadline: &SlaDeadline) -> Result<TicketId, LedgerError> {
            let injected = self
                .anchor_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if self.fail || injected {
                return Err(LedgerError::Unavailable("queue closed".into()));
            }
            self.deadlines.lock().push(deadline.clone());
            Ok(TicketId::new_v4())
        }

        async fn escalated(&self, deadline: &SlaDeadline) -> Result<(), LedgerError> {
            self.escalations.lock().push(deadline.clone());
            if self.fail {
                return Err(LedgerError::Unavailable("queue closed".into()));
            }
            Ok(())
        }
    }

    fn tracker_with(sink: RecordingSink) -> (Arc<SlaTracker>, Arc<RecordingSink>, Arc<ManualTimeSource>) {
        let sink = Arc::new(sink);
        let clock = Arc::new(ManualTimeSource::new(1_000));
        (
            Arc::new(SlaTracker::new(sink.clone(), clock.clone())),
            sink,
            clock,
        )
    }

    fn tracker() -> (Arc<SlaTracker>, Arc<RecordingSink>, Arc<ManualTimeSource>) {
        tracker_with(RecordingSink::default())
    }

    fn id(raw: &str) -> ComplaintId {
        ComplaintId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_set_deadline_anchors() {
        let (tracker, sink, _) = tracker();
        let deadline = tracker.set_deadline(&id("RT1"), 2_000).await.unwrap();

        assert_eq!(deadline.deadline_ts, 2_000);
        assert!(deadline.anchor_ticket.is_some());
        assert_eq!(sink.deadlines.lock().len(), 1);
        assert_eq!(tracker.status(&id("RT1")).state, SlaState::Active);
    }

    #[tokio::test]
    async fn test_deadline_monotonicity() {
        let (tracker, sink, _) = tracker();
        tracker.set_deadline(&id("RT1"), 2_000).await.unwrap();

        assert_eq!(
            tracker.set_deadline(&id("RT1"), 1_500).await.unwrap_err(),
            SlaError::DeadlineMovedEarlier {
                current: 2_000,
                requested: 1_500
            }
        );
        // Identical deadline is a no-op and is not re-anchored.
        tracker.set_deadline(&id("RT1"), 2_000).await.unwrap();
        assert_eq!(sink.deadlines.lock().len(), 1);

        let extended = tracker.set_deadline(&id("RT1"), 3_000).await.unwrap();
        assert_eq!(extended.deadline_ts, 3_000);
        assert_eq!(extended.extensions, 1);
        assert_eq!(sink.deadlines.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_unanchored_deadline_is_anchored_on_repeat() {
        let (tracker, sink, _) = tracker_with(RecordingSink {
            anchor_failures: AtomicUsize::new(1),
            ..RecordingSink::default()
        });
        let first = tracker.set_deadline(&id("RT1"), 2_000).await.unwrap();
        assert!(first.anchor_ticket.is_none());
        assert!(sink.deadlines.lock().is_empty());

        let repeated = tracker.set_deadline(&id("RT1"), 2_000).await.unwrap();
        assert!(repeated.anchor_ticket.is_some());
        assert_eq!(repeated.extensions, 0);
        assert_eq!(sink.deadlines.lock().len(), 1);
        assert_eq!(
            tracker.deadline(&id("RT1")).unwrap().anchor_ticket,
            repeated.anchor_ticket
        );

        // Anchored now, so the next identical call does nothing.
        tracker.set_deadline(&id("RT1"), 2_000).await.unwrap();
        assert_eq!(sink.deadlines.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_past_deadline_rejected() {
        let (tracker, _, _) = tracker();
        assert!(matches!(
            tracker.set_deadline(&id("RT1"), 1_000).await,
            Err(SlaError::DeadlineNotInFuture { .. })
        ));
        assert_eq!(tracker.status(&id("RT1")), SlaStatus::no_deadline());
    }

    #[tokio::test]
    async fn test_escalation_is_idempotent() {
        let (tracker, sink, clock) = tracker();
        tracker.set_deadline(&id("RT1"), 1_001).await.unwrap();

        assert!(!tracker.check_escalation(&id("RT1")).await);
        clock.advance(2);
        assert!(tracker.check_escalation(&id("RT1")).await);
        assert!(!tracker.check_escalation(&id("RT1")).await);

        assert_eq!(sink.escalations.lock().len(), 1);
        let status = tracker.status(&id("RT1"));
        assert_eq!(status.state, SlaState::Escalated);
        assert!(!status.should_escalate);
        assert_eq!(
            tracker.deadline(&id("RT1")).unwrap().escalated_at,
            Some(1_002)
        );
    }

    #[tokio::test]
    async fn test_escalated_deadline_cannot_change() {
        let (tracker, _, clock) = tracker();
        tracker.set_deadline(&id("RT1"), 1_001).await.unwrap();
        clock.advance(5);
        assert!(tracker.check_escalation(&id("RT1")).await);

        assert_eq!(
            tracker.set_deadline(&id("RT1"), 9_000).await.unwrap_err(),
            SlaError::AlreadyEscalated(id("RT1"))
        );
    }

    #[tokio::test]
    async fn test_unknown_complaint_never_escalates() {
        let (tracker, sink, _) = tracker();
        assert!(!tracker.check_escalation(&id("RT404")).await);
        assert!(sink.escalations.lock().is_empty());
    }

    #[tokio::test]
    async fn test_batch_isolation() {
        let (tracker, sink, clock) = tracker();
        tracker.set_deadline(&id("RT1"), 1_001).await.unwrap();
        tracker.set_deadline(&id("RT2"), 1_001).await.unwrap();
        tracker.set_deadline(&id("RT3"), 5_000).await.unwrap();
        clock.advance(10);
        assert!(tracker.check_escalation(&id("RT2")).await);

        let ids = vec![id("RT1"), id("RT2"), id("RT3"), id("RT404")];
        assert_eq!(tracker.batch_check_escalation(&ids).await, 1);
        assert_eq!(tracker.batch_check_escalation(&ids).await, 0);
        assert_eq!(sink.escalations.lock().len(), 2);
        assert_eq!(tracker.status(&id("RT3")).state, SlaState::Active);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_escalate_once() {
        let (tracker, sink, clock) = tracker();
        tracker.set_deadline(&id("RT1"), 1_001).await.unwrap();
        clock.advance(2);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                tracker.check_escalation(&id("RT1")).await
            }));
        }
        let mut transitions = 0;
        for handle in handles {
            if handle.await.unwrap() {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(sink.escalations.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_overdue_ordering_and_limit() {
        let (tracker, _, clock) = tracker();
        tracker.set_deadline(&id("RT3"), 1_030).await.unwrap();
        tracker.set_deadline(&id("RT1"), 1_010).await.unwrap();
        tracker.set_deadline(&id("RT2"), 1_020).await.unwrap();
        tracker.set_deadline(&id("RT4"), 9_000).await.unwrap();
        clock.set(1_100);

        let overdue: Vec<_> = tracker
            .overdue(clock.now(), 2)
            .into_iter()
            .map(|d| d.complaint_id)
            .collect();
        assert_eq!(overdue, vec![id("RT1"), id("RT2")]);
        assert_eq!(tracker.overdue(clock.now(), 50).len(), 3);
    }

    #[tokio::test]
    async fn test_status_time_remaining() {
        let (tracker, _, clock) = tracker();
        tracker.set_deadline(&id("RT1"), 1_060).await.unwrap();

        let status = tracker.status(&id("RT1"));
        assert_eq!(status.deadline_ts, Some(1_060));
        assert_eq!(status.time_remaining, 60);
        assert!(!status.should_escalate);

        clock.set(1_061);
        let status = tracker.status(&id("RT1"));
        assert_eq!(status.time_remaining, 0);
        assert!(status.should_escalate);
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_transition() {
        let (tracker, sink, clock) = tracker_with(RecordingSink {
            fail: true,
            ..RecordingSink::default()
        });
        let deadline = tracker.set_deadline(&id("RT1"), 1_001).await.unwrap();
        assert!(deadline.anchor_ticket.is_none());

        clock.advance(2);
        assert!(tracker.check_escalation(&id("RT1")).await);
        assert!(!tracker.check_escalation(&id("RT1")).await);
        assert_eq!(sink.escalations.lock().len(), 1);
    }
}
