//! Gas pricing and retry timing.

use std::time::Duration;

/// Price of the first broadcast: `base * multiplier / 100`.
pub fn initial_gas_price(base: u128, multiplier_percent: u64) -> u128 {
    base.saturating_mul(u128::from(multiplier_percent)) / 100
}

/// Replace-by-fee price: `old * (100 + bump) / 100`, at least one wei more.
pub fn bump_gas_price(old: u128, bump_percent: u64) -> u128 {
    let bumped = old.saturating_mul(100 + u128::from(bump_percent)) / 100;
    bumped.max(old.saturating_add(1))
}

/// Exponential backoff capped at `max_ms`. Attempt 0 waits `base_ms`.
pub fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 1u64 << attempt.min(16);
    Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
}
