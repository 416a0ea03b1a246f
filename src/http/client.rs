//! Resilient HTTP client for the backend REST API.
//!
//! # Responsibilities
//! - Resolve paths against the configured base URL
//! - Attach the bearer token from the injected `AuthProvider`, only on the
//!   backend's own origin
//! - Time every logical request (diagnostics only)
//! - 401: clear credentials through the provider, fail, never retry
//! - 429: wait `Retry-After` (or the fallback) and resend once
//! - Network errors and 5xx: resend up to 3 times at 1 s, 2 s, 4 s
//! - Everything else: resolve as-is (2xx/3xx) or fail at once (4xx)
//!
//! # Per-request state machine
//! ```text
//! CREATED → SENT → SUCCESS
//!                → AUTH_FAILED (logout side effect)
//!                → RATE_LIMITED → delayed resend → SENT
//!                → TRANSIENT_FAILURE → (retries < max) delayed resend → SENT
//!                                    → (else) FAILED
//! ```

use std::sync::Arc;
use std::time::Duration;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::AuthProvider;
use crate::config::{ClientConfig, RetryConfig};
use crate::error::{ApiError, ApiResult};
use crate::http::request::{RequestBody, RequestDescriptor, RequestOptions};
use crate::http::response::ApiResponse;
use crate::observability::metrics;
use crate::resilience::backoff::backoff_for;
use crate::resilience::{parse_retry_after, Disposition, NetworkFailure, RateLimitPolicy};

/// Authenticated client with transparent recovery from transient failures.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<dyn AuthProvider>,
    retry: RetryConfig,
    rate_limit: RateLimitPolicy,
}

/// Status, headers and body of one attempt.
struct Received {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiClient {
    /// Create a client from configuration and an auth capability.
    pub fn new(config: &ClientConfig, auth: Arc<dyn AuthProvider>) -> ApiResult<Self> {
        let base_url = Url::parse(&config.api.base_url).map_err(|source| ApiError::InvalidUrl {
            url: config.api.base_url.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .user_agent(concat!("site-content-client/", env!("CARGO_PKG_VERSION")));
        if !config.api.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            base_url = %base_url,
            request_timeout_secs = config.timeouts.request_secs,
            max_retries = config.retries.max_retries,
            "API client created"
        );

        Ok(Self {
            http,
            base_url,
            auth,
            retry: config.retries.clone(),
            rate_limit: RateLimitPolicy::from_config(&config.rate_limit),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> ApiResult<Url> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.as_str().trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };
        Url::parse(&raw).map_err(|source| ApiError::InvalidUrl { url: raw, source })
    }

    /// Whether `url` shares the backend's origin. Only those requests carry the token.
    pub fn is_backend(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    /// Issue a request and recover from transient failures.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.url_for(path)?;
        let token = if options.skip_auth || !self.is_backend(&url) {
            None
        } else {
            self.auth.current_token()
        };
        let mut desc = RequestDescriptor::new(method, url, body, token.as_deref(), &options)?;

        let rate_limit = options.rate_limit.clone().unwrap_or_else(|| self.rate_limit.clone());
        let max_retries = if options.transient_retries && self.retry.enabled {
            self.retry.max_retries
        } else {
            0
        };

        let result = self.drive(&mut desc, &rate_limit, max_retries).await;

        let elapsed = desc.elapsed();
        match &result {
            Ok(response) => {
                tracing::debug!(
                    request_id = %desc.request_id,
                    method = %desc.method,
                    url = %desc.url,
                    status = %response.status,
                    attempts = response.attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request completed"
                );
                metrics::record_request(desc.method.as_str(), response.status.as_str(), elapsed);
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %desc.request_id,
                    method = %desc.method,
                    url = %desc.url,
                    attempts = desc.attempt(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Request failed"
                );
                metrics::record_request(desc.method.as_str(), &e.outcome_label(), elapsed);
            }
        }
        result
    }

    async fn drive(
        &self,
        desc: &mut RequestDescriptor,
        rate_limit: &RateLimitPolicy,
        max_retries: u32,
    ) -> ApiResult<ApiResponse> {
        loop {
            tracing::debug!(
                request_id = %desc.request_id,
                method = %desc.method,
                url = %desc.url,
                attempt = desc.attempt(),
                "Sending request"
            );

            let request = desc.build(&self.http)?;
            let received = match fetch(request).await {
                Ok(received) => received,
                Err(source) => {
                    let kind = NetworkFailure::classify(&source);
                    tracing::warn!(
                        request_id = %desc.request_id,
                        attempt = desc.attempt(),
                        kind = kind.code(),
                        error = %source,
                        "No response from backend"
                    );
                    if desc.retry_count < max_retries {
                        self.wait_transient(desc, kind.code()).await;
                        continue;
                    }
                    return Err(ApiError::Network { kind, source });
                }
            };

            match Disposition::of_status(received.status) {
                Disposition::Resolve => {
                    return Ok(ApiResponse {
                        status: received.status,
                        headers: received.headers,
                        body: received.body,
                        elapsed: desc.elapsed(),
                        attempts: desc.attempt(),
                        request_id: desc.request_id,
                    });
                }
                Disposition::Unauthorized => {
                    self.auth.on_unauthorized();
                    return Err(ApiError::AuthExpired);
                }
                Disposition::RateLimited => {
                    let retry_after = parse_retry_after(&received.headers);
                    if desc.rate_limit_retries < rate_limit.max_retries() {
                        desc.rate_limit_retries += 1;
                        let delay = rate_limit.delay(desc.rate_limit_retries, retry_after);
                        tracing::info!(
                            request_id = %desc.request_id,
                            retry = desc.rate_limit_retries,
                            delay = ?delay,
                            retry_after = ?retry_after,
                            "Rate limited, retrying"
                        );
                        metrics::record_retry("rate_limited");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ApiError::RateLimited { retry_after });
                }
                Disposition::Transient => {
                    if desc.retry_count < max_retries {
                        tracing::warn!(
                            request_id = %desc.request_id,
                            attempt = desc.attempt(),
                            status = %received.status,
                            "Server error from backend"
                        );
                        self.wait_transient(desc, "server_error").await;
                        continue;
                    }
                    return Err(ApiError::Server {
                        status: received.status,
                        body: body_text(&received.body),
                    });
                }
                Disposition::Rejected => {
                    return Err(ApiError::Validation {
                        status: received.status,
                        body: body_text(&received.body),
                    });
                }
            }
        }
    }

    async fn wait_transient(&self, desc: &mut RequestDescriptor, reason: &'static str) {
        desc.retry_count += 1;
        let delay = backoff_for(&self.retry, desc.retry_count);
        tracing::info!(
            request_id = %desc.request_id,
            retry = desc.retry_count,
            delay = ?delay,
            reason,
            "Retrying request"
        );
        metrics::record_retry(reason);
        tokio::time::sleep(delay).await;
    }

    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(Method::GET, path, None, RequestOptions::default()).await
    }

    /// GET and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.get(path).await?.json()
    }

    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(Method::DELETE, path, None, RequestOptions::default()).await
    }

    /// Send `body` as JSON with the given method.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let body = RequestBody::json(body)?;
        self.request(method, path, Some(body), options).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.send_json(Method::POST, path, body, RequestOptions::default()).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.send_json(Method::PUT, path, body, RequestOptions::default()).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.send_json(Method::PATCH, path, body, RequestOptions::default()).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

async fn fetch(request: reqwest::RequestBuilder) -> Result<Received, reqwest::Error> {
    let response = request.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    Ok(Received {
        status,
        headers,
        body: body.to_vec(),
    })
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
