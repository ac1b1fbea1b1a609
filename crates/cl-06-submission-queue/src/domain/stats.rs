//! Queue counters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Tasks accepted and not yet finished.
    pub queued: usize,
    /// Complaints with a running drain task.
    pub active_lanes: usize,
    pub executed: u64,
    pub failed: u64,
    pub rejected: u64,
}
