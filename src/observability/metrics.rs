//! Metrics collection.
//!
//! # Metrics
//! - `content_client_requests_total` (counter): finished logical requests by method, outcome
//! - `content_client_request_duration_seconds` (histogram): latency including retries
//! - `content_client_retries_total` (counter): retries by reason
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application picks the exporter
//! - With no recorder installed every call is a no-op

use std::time::Duration;

/// Record a finished logical request.
///
/// `outcome` is the final status code, or an error class such as `timeout`.
pub fn record_request(method: &str, outcome: &str, elapsed: Duration) {
    metrics::counter!(
        "content_client_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "content_client_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Record one retry and why it happened.
pub fn record_retry(reason: &'static str) {
    metrics::counter!("content_client_retries_total", "reason" => reason).increment(1);
}

/// Record an upload rejected before reaching the network.
pub fn record_upload_rejected(kind: &'static str) {
    metrics::counter!("content_client_uploads_rejected_total", "kind" => kind).increment(1);
}
