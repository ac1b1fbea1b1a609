//! # Access Control
//!
//! Resubmitting FAILED tickets and extending SLA deadlines are reserved for
//! the configured admin principal. Everything else is open.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{build, TestLedger, ADMIN, START};
    use cl_02_tx_submitter::{InMemoryLedger, RpcError};
    use serde_json::json;
    use shared_types::{LedgerError, SubmissionStatus, Ticket, TicketId};

    async fn failed_ticket(t: &TestLedger) -> Ticket {
        t.chain
            .inject_send_fault(RpcError::InsufficientFunds("balance 0".into()));
        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Leaking hydrant"}))
            .unwrap();
        t.ledger.wait_idle().await;
        let failed = t.ledger.ticket(&ticket.id).unwrap();
        assert_eq!(failed.status, SubmissionStatus::Failed);
        failed
    }

    #[tokio::test]
    async fn test_resubmit_requires_admin() {
        let (t, _clock) = build(InMemoryLedger::new());
        let failed = failed_ticket(&t).await;

        for principal in ["citizen@example.org", "", "OPS@CITY"] {
            let err = t.ledger.resubmit_failed(principal, &failed.id).unwrap_err();
            assert!(matches!(err, LedgerError::Unauthorized(_)), "{principal:?}");
        }
        assert!(t.chain.accepted_transactions().is_empty());

        let retry = t.ledger.resubmit_failed(ADMIN, &failed.id).unwrap();
        assert_ne!(retry.id, failed.id);
        t.ledger.wait_idle().await;

        assert_eq!(
            t.ledger.ticket(&retry.id).unwrap().status,
            SubmissionStatus::Submitted
        );
        let events = t.ledger.query_events("RT000001").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ticket_id, retry.id);
    }

    #[tokio::test]
    async fn test_resubmit_unknown_ticket_is_not_found() {
        let (t, _clock) = build(InMemoryLedger::new());
        let err = t.ledger.resubmit_failed(ADMIN, &TicketId::nil()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_extension_requires_admin() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.ledger.set_sla_deadline("RT000001", START + 100).await.unwrap();

        let err = t
            .ledger
            .extend_sla_deadline("citizen@example.org", "RT000001", START + 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        assert_eq!(
            t.ledger.sla_status("RT000001").unwrap().deadline_ts,
            Some(START + 100)
        );

        let extended = t
            .ledger
            .extend_sla_deadline(ADMIN, "RT000001", START + 1_000)
            .await
            .unwrap();
        assert_eq!(extended.deadline_ts, START + 1_000);
        assert_eq!(extended.extensions, 1);
    }

    #[tokio::test]
    async fn test_extension_must_move_later() {
        let (t, _clock) = build(InMemoryLedger::new());

        let err = t
            .ledger
            .extend_sla_deadline(ADMIN, "RT000001", START + 100)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        t.ledger.set_sla_deadline("RT000001", START + 100).await.unwrap();
        for earlier in [START + 100, START + 50] {
            let err = t
                .ledger
                .extend_sla_deadline(ADMIN, "RT000001", earlier)
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_open_operations_need_no_principal() {
        let (t, clock) = build(InMemoryLedger::new());
        t.ledger.set_sla_deadline("RT000001", START + 5).await.unwrap();
        clock.advance(6);

        assert!(t.ledger.check_escalation("RT000001").await.unwrap());
        assert!(t.ledger.anchor_evidence("RT000001", b"receipt.pdf").await.is_ok());
    }
}
