//! Queue configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Tasks executing at the same time, across all lanes.
    pub workers: usize,
    /// Tasks accepted but not yet finished, across all lanes.
    pub max_queued: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_queued: 10_000,
        }
    }
}
