//! # Background Scheduler
//!
//! Periodic jobs, each a loop that stops when the shutdown signal flips:
//!
//! | Job | Interval | Work |
//! |-----|----------|------|
//! | Escalation | `escalation_interval_secs` | `overdue` → `batch_check_escalation` |
//! | Reconciler | `reconcile_interval_secs` | mirror `reconcile` against the submitter |
//!
//! The confirmation poller lives in the submitter (`run_poller`).

use cl_04_sla_tracker::{SlaTracker, SlaTrackerApi};
use cl_05_ledger_mirror::{LedgerMirror, LedgerMirrorApi, ReceiptSource, ReconcileReport};
use shared_types::TimeSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Escalate up to `limit` overdue complaints. Returns how many transitioned.
pub async fn escalate_overdue(sla: &SlaTracker, clock: &dyn TimeSource, limit: usize) -> usize {
    let overdue: Vec<_> = sla
        .overdue(clock.now(), limit)
        .into_iter()
        .map(|d| d.complaint_id)
        .collect();
    if overdue.is_empty() {
        return 0;
    }
    let escalated = sla.batch_check_escalation(&overdue).await;
    info!(candidates = overdue.len(), escalated, "Escalation pass complete");
    escalated
}

/// One reconciliation pass over stale SUBMITTED events.
pub async fn reconcile_once(
    mirror: &LedgerMirror,
    source: &dyn ReceiptSource,
    clock: &dyn TimeSource,
) -> ReconcileReport {
    let report = mirror.reconcile(source, clock.now()).await;
    if report.checked > 0 {
        info!(
            checked = report.checked,
            confirmed = report.confirmed,
            failed = report.failed,
            still_submitted = report.still_submitted,
            errors = report.errors.len(),
            "Reconciliation pass complete"
        );
    }
    report
}

pub async fn run_escalation_job(
    sla: Arc<SlaTracker>,
    clock: Arc<dyn TimeSource>,
    interval: Duration,
    batch: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_secs = interval.as_secs(), batch, "Escalation scheduler started");
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {
                let escalated = escalate_overdue(&sla, clock.as_ref(), batch).await;
                if escalated == batch && batch > 0 {
                    debug!("Escalation batch full, more may be overdue");
                }
            }
        }
    }
    info!("Escalation scheduler stopped");
}

pub async fn run_reconciler(
    mirror: Arc<LedgerMirror>,
    source: Arc<dyn ReceiptSource>,
    clock: Arc<dyn TimeSource>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_secs = interval.as_secs(), "Mirror reconciler started");
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {
                let report = reconcile_once(&mirror, source.as_ref(), clock.as_ref()).await;
                for failure in &report.errors {
                    warn!(ticket_id = %failure.ticket_id, message = %failure.message, "Reconciliation error");
                }
            }
        }
    }
    info!("Mirror reconciler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cl_04_sla_tracker::EscalationSink;
    use parking_lot::Mutex;
    use shared_types::{ComplaintId, LedgerError, ManualTimeSource, SlaDeadline, TicketId};

    #[derive(Default)]
    struct CountingSink {
        escalated: Mutex<Vec<ComplaintId>>,
    }

    #[async_trait]
    impl EscalationSink for CountingSink {
        async fn deadline_set(&self, _deadline: &SlaDeadline) -> Result<TicketId, LedgerError> {
            Ok(TicketId::from_u128(1))
        }

        async fn escalated(&self, deadline: &SlaDeadline) -> Result<(), LedgerError> {
            self.escalated.lock().push(deadline.complaint_id.clone());
            Ok(())
        }
    }

    fn id(raw: &str) -> ComplaintId {
        ComplaintId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_escalate_overdue_respects_limit() {
        let clock = Arc::new(ManualTimeSource::new(1_000));
        let sink = Arc::new(CountingSink::default());
        let sla = SlaTracker::new(sink.clone(), clock.clone());

        for (i, raw) in ["RT1", "RT2", "RT3"].iter().enumerate() {
            sla.set_deadline(&id(raw), 1_010 + i as u64).await.unwrap();
        }
        clock.set(2_000);

        assert_eq!(escalate_overdue(&sla, clock.as_ref(), 2).await, 2);
        assert_eq!(*sink.escalated.lock(), vec![id("RT1"), id("RT2")]);
        assert_eq!(escalate_overdue(&sla, clock.as_ref(), 2).await, 1);
        assert_eq!(escalate_overdue(&sla, clock.as_ref(), 2).await, 0);
    }

    #[tokio::test]
    async fn test_escalation_job_runs_until_shutdown() {
        let clock = Arc::new(ManualTimeSource::new(1_000));
        let sink = Arc::new(CountingSink::default());
        let sla = Arc::new(SlaTracker::new(sink.clone(), clock.clone()));
        sla.set_deadline(&id("RT000001"), 1_001).await.unwrap();
        clock.set(1_002);

        let (tx, rx) = watch::channel(false);
        let job = tokio::spawn(run_escalation_job(
            sla.clone(),
            clock.clone(),
            Duration::from_millis(10),
            50,
            rx,
        ));

        tokio::time::timeout(Duration::from_secs(2), async {
            while sink.escalated.lock().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), job)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sink.escalated.lock().len(), 1);
    }
}
