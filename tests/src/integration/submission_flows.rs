//! # Submission Flows
//!
//! Request path through the queue to the simulated chain and back into the
//! mirror:
//!
//! 1. **Nonce safety**: concurrent submissions never share or skip a nonce
//! 2. **Lanes**: same-complaint events broadcast in submission order, and
//!    `seq` follows nonce order
//! 3. **Fee bumping**: unconfirmed transactions are replaced, then FAILED
//! 4. **Reverts and rejections**: surfaced as FAILED tickets; the same
//!    payload submitted again moves onto a fresh ticket
//! 5. **Reconciliation**: stale SUBMITTED mirror entries are healed

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{build, eventually};
    use cl_02_tx_submitter::{InMemoryLedger, RpcError, TransactionSubmitterApi};
    use serde_json::json;
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use shared_types::{
        ComplaintId, EventType, LedgerError, ReceiptStatus, SubmissionStatus, TicketFailure,
        TicketKind, TicketMetadata,
    };
    use std::collections::HashSet;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fifty_concurrent_submits_get_distinct_nonces() {
        let (t, _clock) = build(InMemoryLedger::new());
        let submitter = t.ledger.components().submitter.clone();

        let handles: Vec<_> = (0..50u8)
            .map(|i| {
                let submitter = submitter.clone();
                tokio::spawn(async move {
                    submitter
                        .submit(
                            [i; 32],
                            TicketMetadata::new(
                                ComplaintId::parse(&format!("RT{i:06}")).unwrap(),
                                TicketKind::Event(EventType::Created),
                            ),
                        )
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut nonces = Vec::new();
        for handle in handles {
            nonces.push(handle.await.unwrap().nonce.unwrap());
        }
        nonces.sort_unstable();
        assert_eq!(nonces, (0..50).collect::<Vec<u64>>());

        // The nonce lock spans allocation and broadcast, so the chain saw
        // them strictly in order.
        let seen: Vec<u64> = t
            .chain
            .accepted_transactions()
            .iter()
            .map(|tx| tx.nonce)
            .collect();
        assert_eq!(seen, (0..50).collect::<Vec<u64>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_events_through_queue_have_no_nonce_gaps() {
        let (t, _clock) = build(InMemoryLedger::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let ledger = t.ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .submit_event(
                            &format!("RT{:06}", i % 7),
                            "STATUS_UPDATED",
                            &json!({"note": format!("update {i}"), "new_status": "IN_PROGRESS"}),
                        )
                        .unwrap()
                })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        t.ledger.wait_idle().await;

        let nonces: HashSet<u64> = ids
            .iter()
            .map(|id| t.ledger.ticket(id).unwrap().nonce.unwrap())
            .collect();
        assert_eq!(nonces, (0..50).collect::<HashSet<u64>>());
        assert_eq!(t.ledger.queue_stats().executed, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_complaint_is_broadcast_in_order() {
        let (t, _clock) = build(InMemoryLedger::new());
        for i in 0..10 {
            for complaint in ["RT000001", "RT000002"] {
                t.ledger
                    .submit_event(complaint, "STATUS_UPDATED", &json!({"note": format!("step {i}")}))
                    .unwrap();
            }
        }
        t.ledger.wait_idle().await;

        for complaint in ["RT000001", "RT000002"] {
            let events = t.ledger.query_events(complaint).unwrap();
            assert_eq!(events.len(), 10);
            let nonces: Vec<u64> = events
                .iter()
                .map(|e| t.ledger.ticket(&e.ticket_id).unwrap().nonce.unwrap())
                .collect();
            assert!(
                nonces.windows(2).all(|w| w[0] < w[1]),
                "{complaint} broadcast out of order: {nonces:?}"
            );
            let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
            assert_eq!(seqs, (1..=10).collect::<Vec<u64>>());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_submits_keep_seq_in_nonce_order() {
        let (t, _clock) = build(InMemoryLedger::new());

        let handles: Vec<_> = (0..120)
            .map(|i| {
                let ledger = t.ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .submit_event(
                            &format!("RT{:06}", i % 30),
                            "STATUS_UPDATED",
                            &json!({"note": format!("update {i}")}),
                        )
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        t.ledger.wait_idle().await;

        for c in 0..30 {
            let complaint = format!("RT{c:06}");
            let events = t.ledger.query_events(&complaint).unwrap();
            assert_eq!(events.len(), 4);
            let nonces: Vec<u64> = events
                .iter()
                .map(|e| t.ledger.ticket(&e.ticket_id).unwrap().nonce.unwrap())
                .collect();
            assert!(
                nonces.windows(2).all(|w| w[0] < w[1]),
                "{complaint} seq and nonce disagree: {nonces:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_submitting_a_failed_payload_again_reuses_its_event() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.chain
            .inject_send_fault(RpcError::InsufficientFunds("balance 0".into()));
        let payload = json!({"issue_title": "Blocked drain"});

        let first = t.ledger.submit_event("RT000001", "CREATED", &payload).unwrap();
        t.ledger.wait_idle().await;
        assert_eq!(
            t.ledger.ticket(&first.id).unwrap().status,
            SubmissionStatus::Failed
        );

        let second = t.ledger.submit_event("RT000001", "CREATED", &payload).unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.payload_hash, first.payload_hash);
        t.ledger.wait_idle().await;

        let events = t.ledger.query_events("RT000001").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].seq, 1);
        assert_eq!(events[0].ticket_id, second.id);

        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.confirmed, vec![second.id]);
        assert_eq!(
            t.ledger.query_events("RT000001").unwrap()[0].status,
            SubmissionStatus::Confirmed
        );

        // Now bound to a live ticket, so a third call is a plain duplicate.
        let third = t.ledger.submit_event("RT000001", "CREATED", &payload).unwrap();
        assert_eq!(third.id, second.id);
        assert_eq!(t.chain.accepted_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_by_fee_then_confirm() {
        let (t, clock) = build(InMemoryLedger::manual());
        let ticket = t
            .ledger
            .submit_event("RT000001", "ASSIGNED", &json!({"assigned_to": "roads"}))
            .unwrap();
        t.ledger.wait_idle().await;
        let submitted = t.ledger.ticket(&ticket.id).unwrap();
        assert_eq!(submitted.status, SubmissionStatus::Submitted);

        clock.advance(30);
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert!(report.replaced.is_empty());

        clock.advance(31);
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.replaced, vec![ticket.id]);

        let replaced = t.ledger.ticket(&ticket.id).unwrap();
        assert_eq!(replaced.replacements, 1);
        assert_eq!(replaced.nonce, submitted.nonce);
        assert!(replaced.gas_price > submitted.gas_price);
        assert_eq!(replaced.broadcast_hashes.len(), 2);

        t.chain.mine_block();
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.confirmed, vec![ticket.id]);

        let event = &t.ledger.query_events("RT000001").unwrap()[0];
        assert_eq!(event.status, SubmissionStatus::Confirmed);
        assert_eq!(event.tx_hash, replaced.broadcast_hashes.last().copied());
    }

    #[tokio::test]
    async fn test_retry_exhaustion_fails_with_event() {
        let (t, clock) = build(InMemoryLedger::manual());
        let mut failures = t.ledger.subscribe(EventFilter::topics(vec![EventTopic::Tickets]));

        let ticket = t
            .ledger
            .submit_event("RT000001", "RESOLVED", &json!({"resolution": "patched"}))
            .unwrap();
        t.ledger.wait_idle().await;

        // Two fee-bumped replacements, then the budget is spent.
        for expected in 1..=2 {
            clock.advance(61);
            let report = t.ledger.poll_confirmations().await.unwrap();
            assert_eq!(report.replaced, vec![ticket.id], "replacement {expected}");
        }
        clock.advance(61);
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.failed, vec![ticket.id]);

        let failed = t.ledger.ticket(&ticket.id).unwrap();
        assert_eq!(failed.status, SubmissionStatus::Failed);
        assert_eq!(
            failed.failure,
            Some(TicketFailure::RetriesExhausted { replacements: 2 })
        );
        assert_eq!(
            t.ledger.query_events("RT000001").unwrap()[0].status,
            SubmissionStatus::Failed
        );

        let mut saw_failed = false;
        while let Some(event) = failures.try_recv().unwrap() {
            if let LedgerEvent::TicketFailed(failed) = event {
                assert_eq!(failed.id, ticket.id);
                saw_failed = true;
            }
        }
        assert!(saw_failed);
    }

    #[tokio::test]
    async fn test_revert_marks_event_failed() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.chain.revert_next(1);

        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Fallen tree"}))
            .unwrap();
        t.ledger.wait_idle().await;
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.failed, vec![ticket.id]);

        let failed = t.ledger.ticket(&ticket.id).unwrap();
        assert!(matches!(failed.failure, Some(TicketFailure::Reverted { .. })));

        let event = &t.ledger.query_events("RT000001").unwrap()[0];
        assert_eq!(event.status, SubmissionStatus::Failed);
        assert_eq!(
            event.receipt.as_ref().map(|r| r.status),
            Some(ReceiptStatus::Reverted)
        );
    }

    #[tokio::test]
    async fn test_transient_broadcast_errors_are_retried() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.chain.inject_send_fault(RpcError::Timeout);

        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Graffiti"}))
            .unwrap();
        t.ledger.wait_idle().await;

        let submitted = t.ledger.ticket(&ticket.id).unwrap();
        assert_eq!(submitted.status, SubmissionStatus::Submitted);
        assert_eq!(submitted.nonce, Some(0));
    }

    #[tokio::test]
    async fn test_rejection_is_permanent() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.chain
            .inject_send_fault(RpcError::InsufficientFunds("balance 0".into()));

        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Noise"}))
            .unwrap();
        t.ledger.wait_idle().await;

        assert_eq!(
            t.ledger.ticket(&ticket.id).unwrap().status,
            SubmissionStatus::Failed
        );
        assert_eq!(t.ledger.queue_stats().failed, 1);
        assert!(t.chain.accepted_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_reconciliation_heals_stale_submitted_event() {
        let (t, clock) = build(InMemoryLedger::manual());
        t.ledger.start();

        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Open manhole"}))
            .unwrap();
        t.ledger.wait_idle().await;

        let ledger = t.ledger.clone();
        eventually(|| {
            let ledger = ledger.clone();
            async move {
                ledger.query_events("RT000001").unwrap()[0].status == SubmissionStatus::Submitted
            }
        })
        .await;

        // Mined, but nobody polled.
        t.chain.mine_block();
        let report = t.ledger.reconcile().await;
        assert_eq!(report.checked, 0, "not stale yet");

        clock.advance(301);
        let report = t.ledger.reconcile().await;
        assert_eq!(report.checked, 1);
        assert_eq!(report.confirmed, 1);
        assert!(report.errors.is_empty());

        let event = &t.ledger.query_events("RT000001").unwrap()[0];
        assert_eq!(event.ticket_id, ticket.id);
        assert_eq!(event.status, SubmissionStatus::Confirmed);
        assert!(event.receipt.is_some());

        t.ledger.shutdown().await;
    }

    #[tokio::test]
    async fn test_closed_ledger_rejects_new_work() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.ledger.start();
        t.ledger.shutdown().await;

        let err = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Late"}))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));
        assert!(t.ledger.query_events("RT000001").unwrap().is_empty());
    }
}
