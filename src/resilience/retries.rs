//! Retry decisions.
//!
//! # Responsibilities
//! - Classify an HTTP status into the disposition the client acts on
//! - Classify transport errors (timeout, DNS, refused, unreachable)
//!
//! # Design Decisions
//! - Precedence is fixed: 401, then 429, then transient, then terminal
//! - Every transport failure and every 5xx is transient; other 4xx never are
//! - Classification walks the error source chain instead of matching on
//!   one library's error type

use std::error::Error as StdError;
use std::fmt;
use std::io;
use reqwest::StatusCode;

/// What the client does with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Resolve with the response as-is.
    Resolve,
    /// 401: clear credentials, fail, never retry.
    Unauthorized,
    /// 429: wait and resend under the rate-limit policy.
    RateLimited,
    /// 5xx: retry with exponential backoff.
    Transient,
    /// Any other 4xx: fail immediately.
    Rejected,
}

impl Disposition {
    pub fn of_status(status: StatusCode) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Disposition::Unauthorized
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Disposition::RateLimited
        } else if status.is_server_error() {
            Disposition::Transient
        } else if status.is_client_error() {
            Disposition::Rejected
        } else {
            Disposition::Resolve
        }
    }
}

/// Failure class of a request that got no HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    /// Connect or read deadline elapsed (ETIMEDOUT / ECONNABORTED).
    Timeout,
    /// Host name could not be resolved (ENOTFOUND).
    Dns,
    /// Nothing listening on the remote port (ECONNREFUSED).
    ConnectionRefused,
    /// Any other failure before a response arrived.
    Unreachable,
}

impl NetworkFailure {
    /// Classify a transport error from the HTTP client.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return NetworkFailure::Timeout;
        }
        classify_chain(err).unwrap_or(NetworkFailure::Unreachable)
    }

    /// Conventional errno-style code, used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            NetworkFailure::Timeout => "ETIMEDOUT",
            NetworkFailure::Dns => "ENOTFOUND",
            NetworkFailure::ConnectionRefused => "ECONNREFUSED",
            NetworkFailure::Unreachable => "ENETWORK",
        }
    }

    /// Whether the remote host could not be reached at all.
    pub fn is_host_unreachable(&self) -> bool {
        matches!(self, NetworkFailure::Dns | NetworkFailure::ConnectionRefused)
    }
}

impl fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkFailure::Timeout => "request timed out",
            NetworkFailure::Dns => "host name could not be resolved",
            NetworkFailure::ConnectionRefused => "connection refused",
            NetworkFailure::Unreachable => "network error",
        };
        f.write_str(s)
    }
}

/// Walk an error's source chain looking for a recognizable cause.
pub fn classify_chain(err: &(dyn StdError + 'static)) -> Option<NetworkFailure> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return Some(NetworkFailure::ConnectionRefused),
                io::ErrorKind::TimedOut => return Some(NetworkFailure::Timeout),
                io::ErrorKind::ConnectionAborted => return Some(NetworkFailure::Timeout),
                _ => {}
            }
        }
        let text = e.to_string().to_ascii_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return Some(NetworkFailure::Dns);
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("client error (Connect)")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_status_precedence() {
        assert_eq!(Disposition::of_status(StatusCode::OK), Disposition::Resolve);
        assert_eq!(Disposition::of_status(StatusCode::NOT_MODIFIED), Disposition::Resolve);
        assert_eq!(Disposition::of_status(StatusCode::UNAUTHORIZED), Disposition::Unauthorized);
        assert_eq!(Disposition::of_status(StatusCode::TOO_MANY_REQUESTS), Disposition::RateLimited);
        assert_eq!(Disposition::of_status(StatusCode::INTERNAL_SERVER_ERROR), Disposition::Transient);
        assert_eq!(Disposition::of_status(StatusCode::SERVICE_UNAVAILABLE), Disposition::Transient);
        assert_eq!(Disposition::of_status(StatusCode::BAD_REQUEST), Disposition::Rejected);
        assert_eq!(Disposition::of_status(StatusCode::NOT_FOUND), Disposition::Rejected);
        assert_eq!(Disposition::of_status(StatusCode::FORBIDDEN), Disposition::Rejected);
    }

    #[test]
    fn test_refused_found_in_source_chain() {
        let err = Wrapped(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert_eq!(classify_chain(&err), Some(NetworkFailure::ConnectionRefused));
    }

    #[test]
    fn test_dns_found_by_message() {
        let err = Wrapped(io::Error::new(
            io::ErrorKind::Other,
            "failed to lookup address information: Name or service not known",
        ));
        assert_eq!(classify_chain(&err), Some(NetworkFailure::Dns));
    }

    #[test]
    fn test_timed_out_io() {
        let err = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(classify_chain(&err), Some(NetworkFailure::Timeout));
    }

    #[test]
    fn test_unknown_cause() {
        let err = io::Error::new(io::ErrorKind::Other, "connection reset");
        assert_eq!(classify_chain(&err), None);
    }

    #[test]
    fn test_host_unreachable_classes() {
        assert!(NetworkFailure::Dns.is_host_unreachable());
        assert!(NetworkFailure::ConnectionRefused.is_host_unreachable());
        assert!(!NetworkFailure::Timeout.is_host_unreachable());
        assert_eq!(NetworkFailure::Dns.code(), "ENOTFOUND");
    }
}
