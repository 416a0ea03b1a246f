//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ApiClient, Uploader, CLI produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (human or JSON lines)
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached to every log line of a call
//! - Timing is diagnostic only; it never changes client behavior

pub mod logging;
pub mod metrics;
