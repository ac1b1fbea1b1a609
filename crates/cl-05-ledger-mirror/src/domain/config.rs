//! Mirror configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// A SUBMITTED event older than this is re-checked against the ledger.
    pub stale_after_secs: u64,
    /// Upper bound on events refreshed per reconciliation pass.
    pub reconcile_batch: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 300,
            reconcile_batch: 100,
        }
    }
}
