//! Request description and per-call options.
//!
//! # Responsibilities
//! - Hold everything needed to (re)send one logical request
//! - Generate a unique request ID shared by all attempts
//! - Keep bodies replayable, including multipart forms
//!
//! # Design Decisions
//! - The descriptor is owned by the call in flight and never shared
//! - Headers, including the bearer token, are fixed at creation so every
//!   retry resends the identical request

use std::time::{Duration, Instant};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::resilience::RateLimitPolicy;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Replayable request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes { content_type: String, data: Vec<u8> },
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> ApiResult<Self> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Per-call tweaks to the client's default behavior.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Overrides the configured request timeout.
    pub timeout: Option<Duration>,
    /// Do not attach the bearer token.
    pub skip_auth: bool,
    /// Retry network errors and 5xx responses.
    pub transient_retries: bool,
    /// Overrides the client's 429 policy.
    pub rate_limit: Option<RateLimitPolicy>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            query: Vec::new(),
            timeout: None,
            skip_auth: false,
            transient_retries: true,
            rate_limit: None,
        }
    }
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn without_transient_retries(mut self) -> Self {
        self.transient_retries = false;
        self
    }

    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = Some(policy);
        self
    }
}

/// Everything about one logical request while it is in flight.
#[derive(Debug)]
pub struct RequestDescriptor {
    pub request_id: Uuid,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
    /// Transient retries performed so far.
    pub retry_count: u32,
    /// Rate-limit retries performed so far.
    pub rate_limit_retries: u32,
    pub started_at: Instant,
}

impl RequestDescriptor {
    pub fn new(
        method: Method,
        mut url: Url,
        body: Option<RequestBody>,
        token: Option<&str>,
        options: &RequestOptions,
    ) -> ApiResult<Self> {
        if !options.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(options.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let request_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("bearer token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        // a UUID is always a valid header value
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            headers.insert(X_REQUEST_ID, value);
        }

        Ok(Self {
            request_id,
            method,
            url,
            headers,
            body,
            timeout: options.timeout,
            retry_count: 0,
            rate_limit_retries: 0,
            started_at: Instant::now(),
        })
    }

    /// 1-based number of the attempt about to be sent.
    pub fn attempt(&self) -> u32 {
        1 + self.retry_count + self.rate_limit_retries
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Build a fresh request for the next attempt.
    pub fn build(&self, http: &reqwest::Client) -> ApiResult<reqwest::RequestBuilder> {
        let mut builder = http
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match &self.body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Bytes { content_type, data }) => {
                builder.header(CONTENT_TYPE, content_type.as_str()).body(data.clone())
            }
            Some(RequestBody::Multipart(parts)) => builder.multipart(build_form(parts)?),
        };

        Ok(builder)
    }
}

fn build_form(parts: &[FormPart]) -> ApiResult<Form> {
    let mut form = Form::new();
    for part in parts {
        let mut p = Part::bytes(part.data.clone());
        if let Some(file_name) = &part.file_name {
            p = p.file_name(file_name.clone());
        }
        if let Some(content_type) = &part.content_type {
            p = p
                .mime_str(content_type)
                .map_err(|e| ApiError::InvalidRequest(format!("content type '{}': {}", content_type, e)))?;
        }
        form = form.part(part.name.clone(), p);
    }
    Ok(form)
}
