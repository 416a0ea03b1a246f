//! Session state shared between the HTTP client and its callers.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::auth::store::TokenStore;
use crate::auth::AuthProvider;

/// Notifications about the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected our token; the user must log in again.
    LoginRequired,
    /// A new token was stored.
    LoggedIn,
    /// The token was removed on request.
    LoggedOut,
}

/// Token-backed [`AuthProvider`] that broadcasts session changes.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { store, events }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.get().is_some()
    }

    /// Store a freshly issued token.
    pub fn login(&self, token: &str) -> std::io::Result<()> {
        self.store.set(token)?;
        let _ = self.events.send(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Forget the token.
    pub fn logout(&self) -> std::io::Result<()> {
        self.store.clear()?;
        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }
}

impl AuthProvider for Session {
    fn current_token(&self) -> Option<String> {
        self.store.get()
    }

    fn on_unauthorized(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored token after 401");
        }
        tracing::warn!("Backend rejected credentials, login required");
        let _ = self.events.send(SessionEvent::LoginRequired);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;

    #[test]
    fn test_unauthorized_clears_and_notifies() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let mut events = session.subscribe();
        assert_eq!(session.current_token().as_deref(), Some("abc"));

        session.on_unauthorized();

        assert_eq!(session.current_token(), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoginRequired);
    }

    #[test]
    fn test_login_logout_events() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        let mut events = session.subscribe();

        session.login("t1").unwrap();
        assert!(session.is_logged_in());
        session.logout().unwrap();
        assert!(!session.is_logged_in());

        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedIn);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);
    }
}
