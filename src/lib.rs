//! Client library for the company website's content backend.
//!
//! # Architecture Overview
//!
//! ```text
//!   site-admin CLI / embedding app
//!        │
//!        ▼
//!   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐
//!   │ content  │ │ catalog  │ │  upload  │ │ auth api │
//!   │ sections │ │ products │ │  media   │ │  login   │
//!   └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬─────┘
//!        └────────────┴─────┬──────┴────────────┘
//!                           ▼
//!                   ┌───────────────┐      ┌──────────────┐
//!                   │ http::client  │◀────▶│ AuthProvider │
//!                   │  ApiClient    │      │  (session)   │
//!                   └───────┬───────┘      └──────────────┘
//!                           │ retries, 429, 401
//!                           ▼
//!                   ┌───────────────┐
//!                   │  resilience   │
//!                   └───────────────┘
//!                           │
//!                           ▼
//!                    backend REST API
//! ```

pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod upload;

pub use auth::{AuthProvider, NoAuth, Session};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::{ApiClient, ApiResponse, RequestBody, RequestOptions};
