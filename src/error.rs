//! Error taxonomy for backend calls.
//!
//! `Display` is the developer-facing text; [`ApiError::user_message`] is the
//! normalized text meant for people using the dashboard.

use std::time::Duration;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;
use crate::resilience::NetworkFailure;

/// Errors returned by the content client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the backend. The stored token has already been cleared.
    #[error("authentication expired (401)")]
    AuthExpired,

    /// 429 persisted after the rate-limit retries were spent.
    #[error("rate limited by backend (429)")]
    RateLimited { retry_after: Option<Duration> },

    /// No HTTP response was received.
    #[error("{kind}: {source}")]
    Network {
        kind: NetworkFailure,
        #[source]
        source: reqwest::Error,
    },

    /// 5xx after the transient retries were spent.
    #[error("server error {status}: {body}")]
    Server { status: StatusCode, body: String },

    /// Any other 4xx. Never retried.
    #[error("request rejected with {status}: {body}")]
    Validation { status: StatusCode, body: String },

    /// Upload endpoint answered but reported failure.
    #[error("upload failed: {0}")]
    Upload(String),

    /// File refused before any network call (size or MIME type).
    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for content client operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Message suitable for showing to a dashboard user.
    ///
    /// Network and server failures are rewritten by failure class; 4xx
    /// responses surface the backend's own text untouched.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::AuthExpired => "Your session has expired. Please log in again.".into(),
            ApiError::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again.".into()
            }
            ApiError::Network { kind: NetworkFailure::Timeout, .. } => {
                "The request timed out. Please check your connection and try again.".into()
            }
            ApiError::Network { kind, .. } if kind.is_host_unreachable() => {
                "Unable to reach the server. Please check your internet connection or try again later.".into()
            }
            ApiError::Network { .. } => {
                "Network error. Please check your connection and try again.".into()
            }
            ApiError::Server { .. } => {
                "The server encountered an error. Please try again later.".into()
            }
            ApiError::Validation { status, body } => {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.clone()
                }
            }
            ApiError::Upload(message) | ApiError::InvalidFile(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Server { status, .. } | ApiError::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome_label(&self) -> String {
        match self {
            ApiError::Network { kind, .. } => kind.code().to_string(),
            other => match other.status() {
                Some(status) => status.as_u16().to_string(),
                None => "error".to_string(),
            },
        }
    }
}
