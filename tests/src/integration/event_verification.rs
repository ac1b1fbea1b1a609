//! # Event Verification
//!
//! `verify_event(complaint, payload_hash)` answers true only for a CONFIRMED
//! event of that complaint. Pending, failed, foreign and unknown hashes all
//! answer false.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::build;
    use cl_02_tx_submitter::InMemoryLedger;
    use serde_json::json;
    use shared_types::{to_hex, LedgerError};

    #[tokio::test]
    async fn test_confirmed_event_verifies() {
        let (t, _clock) = build(InMemoryLedger::new());
        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Broken bench"}))
            .unwrap();
        let hash = to_hex(&ticket.payload_hash);
        t.ledger.wait_idle().await;
        assert!(!t.ledger.verify_event("RT000001", &hash).unwrap());

        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.confirmed, vec![ticket.id]);

        assert!(t.ledger.verify_event("RT000001", &hash).unwrap());
        assert!(t.ledger.verify_event("RT000001", &hash[2..]).unwrap());
    }

    #[tokio::test]
    async fn test_unconfirmed_event_does_not_verify() {
        let (t, _clock) = build(InMemoryLedger::manual());
        let ticket = t
            .ledger
            .submit_event("RT000001", "ASSIGNED", &json!({"assigned_to": "parks"}))
            .unwrap();
        t.ledger.wait_idle().await;
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert!(report.confirmed.is_empty());

        let hash = to_hex(&ticket.payload_hash);
        assert!(!t.ledger.verify_event("RT000001", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_reverted_event_does_not_verify() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.chain.revert_next(1);
        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Loose railing"}))
            .unwrap();
        t.ledger.wait_idle().await;
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.failed, vec![ticket.id]);

        let hash = to_hex(&ticket.payload_hash);
        assert!(!t.ledger.verify_event("RT000001", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_foreign_and_unknown_hashes_do_not_verify() {
        let (t, _clock) = build(InMemoryLedger::new());
        let ticket = t
            .ledger
            .submit_event("RT000001", "CREATED", &json!({"issue_title": "Flooded underpass"}))
            .unwrap();
        t.ledger.wait_idle().await;
        t.ledger.poll_confirmations().await.unwrap();
        let hash = to_hex(&ticket.payload_hash);
        assert!(t.ledger.verify_event("RT000001", &hash).unwrap());

        // Confirmed, but under another complaint.
        assert!(!t.ledger.verify_event("RT000002", &hash).unwrap());
        assert!(!t.ledger.verify_event("RT000001", &to_hex(&[0xAB; 32])).unwrap());
    }

    #[tokio::test]
    async fn test_malformed_input_is_rejected() {
        let (t, _clock) = build(InMemoryLedger::new());
        let valid = to_hex(&[0x01; 32]);

        for hash in ["0x1234", "not hex", ""] {
            let err = t.ledger.verify_event("RT000001", hash).unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{hash:?}");
        }
        let err = t.ledger.verify_event("RT 1", &valid).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
