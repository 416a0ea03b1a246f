//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! caller (content, catalog, upload, auth)
//!     → client.rs (resolve URL, attach token)
//!     → request.rs (RequestDescriptor: replayable body, request ID)
//!     → send attempt
//!     → resilience (decide: resolve, logout, wait and resend, fail)
//!     → response.rs (ApiResponse with timing)
//! ```

pub mod client;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use request::{FormPart, RequestBody, RequestDescriptor, RequestOptions, X_REQUEST_ID};
pub use response::ApiResponse;
