//! Named content sections.
//!
//! A section is a JSON blob identified by `(section, pageType)`, e.g.
//! `("hero", "home")` or `("about-us-stats", "about")`.

use std::fmt;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ApiResponse, RequestOptions};
use crate::resilience::RateLimitPolicy;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Rate-limit retries allowed on the `upsert_section_next` path (2 s, then 4 s).
pub const UPSERT_NEXT_MAX_RETRIES: u32 = 2;

/// Identifies a content section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionKey {
    pub section: String,
    pub page_type: String,
}

impl SectionKey {
    pub fn new(section: impl Into<String>, page_type: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            page_type: page_type.into(),
        }
    }

    /// `/api/content/{section}/{pageType}` with both segments escaped.
    pub fn path(&self) -> String {
        format!(
            "/api/content/{}/{}",
            utf8_percent_encode(&self.section, SEGMENT),
            utf8_percent_encode(&self.page_type, SEGMENT)
        )
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.page_type)
    }
}

/// GET response shape: `{ "content": { ... } }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SectionEnvelope<T> {
    pub content: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertBody<'a, T> {
    section: &'a str,
    page_type: &'a str,
    content: &'a T,
}

#[derive(Serialize)]
struct PatchBody<'a, T> {
    content: &'a T,
}

/// Read and write content sections through the shared client.
#[derive(Debug, Clone)]
pub struct ContentApi {
    client: ApiClient,
}

impl ContentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch a section's `content`.
    pub async fn get_section<T: DeserializeOwned>(&self, key: &SectionKey) -> ApiResult<T> {
        let envelope: SectionEnvelope<T> = self.client.get_json(&key.path()).await?;
        Ok(envelope.content)
    }

    /// Fetch a section, mapping 404 to `None`.
    pub async fn get_section_opt<T: DeserializeOwned>(&self, key: &SectionKey) -> ApiResult<Option<T>> {
        match self.get_section(key).await {
            Ok(content) => Ok(Some(content)),
            Err(ApiError::Validation { status, .. }) if status == StatusCode::NOT_FOUND => {
                tracing::debug!(section = %key, "Section does not exist yet");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Create or replace a section wholesale.
    pub async fn upsert_section<T: Serialize>(&self, key: &SectionKey, content: &T) -> ApiResult<ApiResponse> {
        let body = UpsertBody {
            section: &key.section,
            page_type: &key.page_type,
            content,
        };
        let response = self.client.post_json("/api/content", &body).await?;
        tracing::info!(section = %key, "Section saved");
        Ok(response)
    }

    /// Update a section's content in place.
    pub async fn patch_section<T: Serialize>(&self, key: &SectionKey, content: &T) -> ApiResult<ApiResponse> {
        self.client
            .send_json(Method::PATCH, &key.path(), &PatchBody { content }, RequestOptions::default())
            .await
    }

    /// Upsert with its own rate-limit schedule.
    ///
    /// 429 responses are waited out for a fixed `2^attempt` seconds (2 s, 4 s)
    /// regardless of `Retry-After`; network errors and 5xx are not retried.
    pub async fn upsert_section_next<T: Serialize>(&self, key: &SectionKey, content: &T) -> ApiResult<ApiResponse> {
        let body = UpsertBody {
            section: &key.section,
            page_type: &key.page_type,
            content,
        };
        let options = RequestOptions::default()
            .without_transient_retries()
            .rate_limit(RateLimitPolicy::FixedExponential {
                max_retries: UPSERT_NEXT_MAX_RETRIES,
            });
        self.client
            .send_json(Method::POST, "/api/content", &body, options)
            .await
    }
}
