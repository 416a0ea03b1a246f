//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! login (api.rs) → token → store.rs (memory or file)
//!
//! every request:
//!     ApiClient → AuthProvider::current_token() → Authorization: Bearer <token>
//!
//! on HTTP 401:
//!     ApiClient → AuthProvider::on_unauthorized()
//!         → session.rs clears the store
//!         → SessionEvent::LoginRequired broadcast to subscribers
//! ```
//!
//! # Design Decisions
//! - The client never reads ambient global state; the provider is injected
//! - Token reads are lock-free (`arc-swap`), clears are idempotent

pub mod api;
pub mod session;
pub mod store;

pub use api::{AuthApi, Credentials, LoginResponse};
pub use session::{Session, SessionEvent};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Capability the HTTP client uses to authenticate requests.
pub trait AuthProvider: Send + Sync {
    /// Token to send as `Authorization: Bearer <token>`, if any.
    fn current_token(&self) -> Option<String>;

    /// Called once when the backend answers 401.
    fn on_unauthorized(&self);
}

/// Provider for unauthenticated use (public site content).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn current_token(&self) -> Option<String> {
        None
    }

    fn on_unauthorized(&self) {
        tracing::debug!("401 received without credentials");
    }
}
