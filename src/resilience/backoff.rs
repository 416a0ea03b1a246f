//! Exponential backoff with optional jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::RetryConfig;

/// Calculate the delay before retry number `attempt` (1-based).
///
/// The delay is `base_ms * 2^(attempt - 1)`, capped at `max_ms`, plus up to
/// `jitter_ratio` of that value chosen at random.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, jitter_ratio: f64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = (capped_delay as f64 * jitter_ratio.clamp(0.0, 1.0)) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Backoff for retry `attempt` using the configured schedule.
pub fn backoff_for(config: &RetryConfig, attempt: u32) -> Duration {
    calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms, config.jitter_ratio)
}
