//! # Evidence Flows
//!
//! ```text
//! anchor_evidence(bytes) ──→ store {complaint}/{sha256} ──→ anchor ticket ──→ chain
//! verify_evidence(bytes) ──→ record CONFIRMED? ──→ re-hash stored file ──→ match?
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::build;
    use cl_02_tx_submitter::InMemoryLedger;
    use shared_types::{LedgerError, SubmissionStatus};
    use std::collections::HashSet;

    const PHOTO: &[u8] = b"\x89PNG pothole on 5th avenue";

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_anchors_share_one_transaction() {
        let (t, _clock) = build(InMemoryLedger::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let ledger = t.ledger.clone();
                tokio::spawn(async move { ledger.anchor_evidence("RT000001", PHOTO).await.unwrap() })
            })
            .collect();
        let mut tickets = HashSet::new();
        for handle in handles {
            tickets.insert(handle.await.unwrap().ticket_id);
        }
        t.ledger.wait_idle().await;

        assert_eq!(tickets.len(), 1);
        assert_eq!(t.ledger.evidence_records("RT000001").unwrap().len(), 1);
        assert_eq!(t.chain.accepted_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_anchor_confirm_verify() {
        let (t, _clock) = build(InMemoryLedger::new());
        let record = t.ledger.anchor_evidence("RT000001", PHOTO).await.unwrap();
        assert_eq!(record.file_size, PHOTO.len() as u64);
        assert!(t.dir.path().join(&record.storage_path).exists());

        t.ledger.wait_idle().await;
        let report = t.ledger.poll_confirmations().await.unwrap();
        assert_eq!(report.confirmed, vec![record.ticket_id]);

        let verified = t.ledger.verify_evidence("RT000001", PHOTO).await.unwrap();
        assert!(verified.verified);
        assert_eq!(verified.status, SubmissionStatus::Confirmed);
        assert!(verified.tx_hash.is_some());
    }

    #[tokio::test]
    async fn test_tampered_file_fails_verification() {
        let (t, _clock) = build(InMemoryLedger::new());
        let record = t.ledger.anchor_evidence("RT000001", PHOTO).await.unwrap();
        t.ledger.wait_idle().await;
        t.ledger.poll_confirmations().await.unwrap();

        std::fs::write(t.dir.path().join(&record.storage_path), b"edited afterwards").unwrap();

        let err = t
            .ledger
            .verify_evidence("RT000001", PHOTO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Integrity(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_unanchored_file_is_not_found() {
        let (t, _clock) = build(InMemoryLedger::new());
        t.ledger.anchor_evidence("RT000001", PHOTO).await.unwrap();

        let err = t
            .ledger
            .verify_evidence("RT000001", b"never uploaded")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        // Same bytes, different complaint.
        let err = t
            .ledger
            .verify_evidence("RT000002", PHOTO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_verify_before_confirmation_is_rejected() {
        let (t, _clock) = build(InMemoryLedger::manual());
        t.ledger.anchor_evidence("RT000001", PHOTO).await.unwrap();
        t.ledger.wait_idle().await;

        let err = t
            .ledger
            .verify_evidence("RT000001", PHOTO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let (t, _clock) = build(InMemoryLedger::new());
        let err = t.ledger.anchor_evidence("RT000001", b"").await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(t.ledger.evidence_records("RT000001").unwrap().is_empty());
        assert!(t.chain.accepted_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_same_file_for_two_complaints_is_anchored_twice() {
        let (t, _clock) = build(InMemoryLedger::new());
        let first = t.ledger.anchor_evidence("RT000001", PHOTO).await.unwrap();
        let second = t.ledger.anchor_evidence("RT000002", PHOTO).await.unwrap();
        t.ledger.wait_idle().await;

        assert_ne!(first.ticket_id, second.ticket_id);
        assert_ne!(first.storage_path, second.storage_path);
        assert_eq!(t.chain.accepted_transactions().len(), 2);
    }
}
