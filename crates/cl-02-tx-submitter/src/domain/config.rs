//! Submitter configuration.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Tuning knobs for signing, broadcasting and confirmation tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitterConfig {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Registry contract receiving `anchor(bytes32,bytes32)` calls.
    pub registry_address: Address,
    pub gas_limit: u64,
    /// Base gas price in wei before the multiplier.
    pub base_gas_price: u128,
    /// Applied to the base price for the first broadcast (110 = 1.1x).
    pub gas_price_multiplier_percent: u64,
    /// Replace-by-fee increment.
    pub fee_bump_percent: u64,
    /// Fee-bumped replacements before a ticket is FAILED.
    pub max_retries: u32,
    /// Blocks (including the inclusion block) before CONFIRMED.
    pub confirmation_depth: u64,
    /// Seconds without a receipt before a replacement is broadcast.
    pub confirmation_timeout_secs: u64,
    /// Broadcast attempts on transient errors before a ticket is FAILED.
    pub broadcast_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Poller interval while tickets are outstanding.
    pub poll_interval_ms: u64,
    /// Poller interval ceiling while idle or failing.
    pub poll_backoff_max_ms: u64,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            registry_address: [0u8; 20],
            gas_limit: 500_000,
            base_gas_price: 20_000_000_000,
            gas_price_multiplier_percent: 110,
            fee_bump_percent: 10,
            max_retries: 3,
            confirmation_depth: 3,
            confirmation_timeout_secs: 120,
            broadcast_attempts: 5,
            backoff_base_ms: 200,
            backoff_max_ms: 5_000,
            poll_interval_ms: 2_000,
            poll_backoff_max_ms: 30_000,
        }
    }
}
