//! HTTP 429 handling.
//!
//! Two independent policies exist:
//! - `RetryAfter`: honor the server's `Retry-After` header, else a fixed
//!   fallback delay. Used by every call through the shared client.
//! - `FixedExponential`: ignore the header and wait `2^attempt` seconds
//!   (2 s, 4 s, ...). Used by the section upsert path that keeps its own loop.

use std::time::Duration;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::config::RateLimitConfig;

/// How a 429 response is waited out.
#[derive(Debug, Clone, PartialEq)]
pub enum RateLimitPolicy {
    RetryAfter {
        max_retries: u32,
        fallback: Duration,
    },
    FixedExponential {
        max_retries: u32,
    },
}

impl RateLimitPolicy {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        RateLimitPolicy::RetryAfter {
            max_retries: config.max_retries,
            fallback: Duration::from_millis(config.fallback_delay_ms),
        }
    }

    pub fn max_retries(&self) -> u32 {
        match self {
            RateLimitPolicy::RetryAfter { max_retries, .. } => *max_retries,
            RateLimitPolicy::FixedExponential { max_retries } => *max_retries,
        }
    }

    /// Delay before rate-limit retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match self {
            RateLimitPolicy::RetryAfter { fallback, .. } => retry_after.unwrap_or(*fallback),
            RateLimitPolicy::FixedExponential { .. } => {
                Duration::from_secs(2u64.saturating_pow(attempt))
            }
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

/// Read `Retry-After` as a number of seconds.
///
/// HTTP-date values and garbage yield `None` so the caller falls back.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let secs: f64 = raw.parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}
