//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Response or transport error from one attempt:
//!     → retries.rs (disposition: resolve / 401 / 429 / transient / rejected)
//!     → 429: rate_limit.rs (Retry-After or fixed exponential delay)
//!     → transient: backoff.rs (base * 2^(n-1) delay)
//!     → ApiClient resends the same RequestDescriptor or gives up
//! ```
//!
//! # Design Decisions
//! - Rate-limit and transient retries use separate counters
//! - Retries of one logical request are strictly sequential
//! - Every outbound call has a deadline (request timeout)

pub mod backoff;
pub mod rate_limit;
pub mod retries;

pub use backoff::calculate_backoff;
pub use rate_limit::{parse_retry_after, RateLimitPolicy};
pub use retries::{Disposition, NetworkFailure};
