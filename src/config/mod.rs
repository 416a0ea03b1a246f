//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (API_BASE_URL, SITE_ADMIN_TOKEN_PATH)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to ApiClient, Uploader, logging init
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment wins over the file so deployments only need one variable
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::ClientConfig;
pub use schema::{
    ApiConfig, AuthConfig, ObservabilityConfig, RateLimitConfig, RetryConfig, TimeoutConfig,
    UploadConfig,
};
