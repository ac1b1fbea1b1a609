//! # End-to-End SLA Escalation
//!
//! ```text
//! set_sla_deadline(RT000001, now+1s) ──→ [SLA Tracker] ──deadline_set──→ anchor ticket
//!        ... 2s ...
//! check_escalation(RT000001) ──→ ACTIVE → ESCALATED ──escalated──→ ESCALATED event
//!                                                       │            │
//!                                                       ↓            ↓
//!                                            ComplaintEscalated   mirror + queue
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{build, build_with, START};
    use cl_02_tx_submitter::InMemoryLedger;
    use serde_json::json;
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use shared_types::{
        EventType, SlaState, SubmissionStatus, SystemTimeSource, TicketKind, TimeSource,
    };
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_deadline_passes_then_escalates_exactly_once() {
        let clock = Arc::new(SystemTimeSource);
        let t = build_with(InMemoryLedger::new(), clock.clone(), |_| {});
        let mut escalations = t.ledger.subscribe(EventFilter::topics(vec![EventTopic::Sla]));

        let now = clock.now();
        t.ledger.set_sla_deadline("RT000001", now + 1).await.unwrap();
        assert!(!t.ledger.check_escalation("RT000001").await.unwrap());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(t.ledger.check_escalation("RT000001").await.unwrap());
        assert!(!t.ledger.check_escalation("RT000001").await.unwrap());

        let escalated: Vec<_> = t
            .ledger
            .query_events("RT000001")
            .unwrap()
            .into_iter()
            .filter(|e| e.event_type == EventType::Escalated)
            .collect();
        assert_eq!(escalated.len(), 1);

        match escalations.try_recv().unwrap() {
            Some(LedgerEvent::ComplaintEscalated {
                complaint_id,
                deadline_ts,
                ..
            }) => {
                assert_eq!(complaint_id.as_str(), "RT000001");
                assert_eq!(deadline_ts, now + 1);
            }
            other => panic!("expected ComplaintEscalated, got {other:?}"),
        }
        assert!(escalations.try_recv().unwrap().is_none());

        let status = t.ledger.sla_status("RT000001").unwrap();
        assert_eq!(status.state, SlaState::Escalated);
        assert_eq!(status.time_remaining, 0);
    }

    #[tokio::test]
    async fn test_escalation_and_deadline_reach_the_chain() {
        let (t, clock) = build(InMemoryLedger::new());
        t.ledger
            .set_sla_deadline("RT000001", START + 60)
            .await
            .unwrap();
        clock.advance(61);
        assert!(t.ledger.check_escalation("RT000001").await.unwrap());

        t.ledger.wait_idle().await;
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.confirmed.len(), 2);

        let kinds: Vec<TicketKind> = t
            .ledger
            .tickets_with_status(SubmissionStatus::Confirmed)
            .into_iter()
            .map(|ticket| ticket.metadata.kind)
            .collect();
        assert!(kinds.contains(&TicketKind::SlaDeadline));
        assert!(kinds.contains(&TicketKind::Event(EventType::Escalated)));

        let confirmed = t.ledger.confirmed_events("RT000001").unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].event_type, EventType::Escalated);
    }

    #[tokio::test]
    async fn test_escalation_follows_earlier_events_in_sequence() {
        let (t, clock) = build(InMemoryLedger::new());
        t.ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Broken drain"}))
            .unwrap();
        t.ledger
            .set_sla_deadline("RT000001", START + 10)
            .await
            .unwrap();
        clock.advance(11);
        assert!(t.ledger.check_escalation("RT000001").await.unwrap());

        let events = t.ledger.query_events("RT000001").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Created);
        assert_eq!(events[1].event_type, EventType::Escalated);
        assert!(events[0].seq < events[1].seq);
    }

    #[tokio::test]
    async fn test_batch_check_isolates_complaints() {
        let (t, clock) = build(InMemoryLedger::new());
        t.ledger.set_sla_deadline("RT000001", START + 5).await.unwrap();
        t.ledger.set_sla_deadline("RT000002", START + 500).await.unwrap();
        t.ledger.set_sla_deadline("RT000003", START + 5).await.unwrap();
        clock.advance(10);
        assert!(t.ledger.check_escalation("RT000003").await.unwrap());

        // Due, not yet due, already escalated, unknown, malformed.
        let count = t
            .ledger
            .batch_check_escalation(&["RT000001", "RT000002", "RT000003", "RT999999", "bad id!"])
            .await;
        assert_eq!(count, 1);

        assert_eq!(t.ledger.sla_status("RT000001").unwrap().state, SlaState::Escalated);
        assert_eq!(t.ledger.sla_status("RT000002").unwrap().state, SlaState::Active);
        assert_eq!(t.ledger.sla_status("RT999999").unwrap().state, SlaState::NoDeadline);
    }

    #[tokio::test]
    async fn test_deadline_never_moves_earlier() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.ledger.set_sla_deadline("RT000001", START + 100).await.unwrap();

        assert!(t.ledger.set_sla_deadline("RT000001", START + 50).await.is_err());
        assert!(t.ledger.set_sla_deadline("RT000002", START).await.is_err());

        let kept = t.ledger.set_sla_deadline("RT000001", START + 100).await.unwrap();
        assert_eq!(kept.deadline_ts, START + 100);
        assert_eq!(kept.extensions, 0);
    }

    #[tokio::test]
    async fn test_scheduler_escalates_overdue_complaints() {
        let (t, clock) = build(InMemoryLedger::new());
        for id in ["RT000001", "RT000002", "RT000003"] {
            t.ledger.set_sla_deadline(id, START + 5).await.unwrap();
        }
        clock.advance(6);

        assert_eq!(t.ledger.escalate_overdue(2).await, 2);
        assert_eq!(t.ledger.escalate_overdue(2).await, 1);
        assert_eq!(t.ledger.escalate_overdue(2).await, 0);
    }
}
