//! Wired ledger over a simulated chain.

use cl_02_tx_submitter::{InMemoryLedger, LocalKeySigner};
use ledger_runtime::{ComplaintLedger, LedgerBackend, LedgerComponents, LedgerConfig};
use shared_types::{ManualTimeSource, TimeSource, Timestamp};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const ADMIN: &str = "ops@city";
pub const START: Timestamp = 1_700_000_000;

pub struct TestLedger {
    pub ledger: Arc<ComplaintLedger>,
    pub chain: Arc<InMemoryLedger>,
    pub dir: TempDir,
}

/// Settings every scenario shares: one confirmation, fast broadcast retries,
/// background loops that stay quiet unless a test starts them on purpose.
pub fn base_config(dir: &TempDir) -> LedgerConfig {
    let mut config = LedgerConfig::default();
    config.storage.evidence_dir = dir.path().to_path_buf();
    config.access.admin_principal = ADMIN.to_string();
    config.submitter.confirmation_depth = 1;
    config.submitter.confirmation_timeout_secs = 60;
    config.submitter.max_retries = 2;
    config.submitter.broadcast_attempts = 2;
    config.submitter.backoff_base_ms = 1;
    config.submitter.backoff_max_ms = 2;
    config.submitter.poll_interval_ms = 3_600_000;
    config.submitter.poll_backoff_max_ms = 3_600_000;
    config.scheduler.escalation_interval_secs = 3_600;
    config.scheduler.reconcile_interval_secs = 3_600;
    config
}

pub fn build_with<F>(chain: InMemoryLedger, clock: Arc<dyn TimeSource>, tweak: F) -> TestLedger
where
    F: FnOnce(&mut LedgerConfig),
{
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config(&dir);
    tweak(&mut config);

    let chain = Arc::new(chain);
    let backend = LedgerBackend {
        rpc: chain.clone(),
        signer: Arc::new(LocalKeySigner::from_bytes(&[0x42; 32]).unwrap()),
    };
    let components = LedgerComponents::with_backend(config, backend, clock);
    TestLedger {
        ledger: Arc::new(ComplaintLedger::new(components)),
        chain,
        dir,
    }
}

/// Ledger on a manual clock starting at `START`.
pub fn build(chain: InMemoryLedger) -> (TestLedger, Arc<ManualTimeSource>) {
    let clock = Arc::new(ManualTimeSource::new(START));
    (build_with(chain, clock.clone(), |_| {}), clock)
}

/// Poll `condition` until it holds, failing after two seconds.
pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within 2s");
}
