//! # Navigation and Forced Logout
//!
//! The sync layer never renders anything, but a rejected token has to send
//! the user somewhere. [`Navigator`] is that seam: the UI (or the CLI)
//! implements it, and [`SessionGuard`] calls it after wiping local state.
//!
//! ## 401 Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiClient gets 401 on an authenticated call                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  SessionGuard::handle_unauthorized()                                    │
//! │        ├── CredentialStore::clear()   (token + isAdmin)                 │
//! │        ├── CartStore::clear()         (cart)                            │
//! │        └── Navigator::redirect("/login")                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  caller receives ClientError::Unauthorized                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use pageturner_core::LOGIN_ROUTE;
use pageturner_store::{CartStore, CredentialStore};
use tracing::{info, warn};

// =============================================================================
// Navigator Trait
// =============================================================================

/// Receives route changes requested by the sync layer.
pub trait Navigator: Send + Sync {
    /// Moves the user to `route`.
    fn redirect(&self, route: &str);
}

/// Ignores redirects. Used when nothing is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn redirect(&self, _route: &str) {}
}

/// Remembers every redirect. Handy for tests and headless front-ends.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All routes so far, oldest first.
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent route.
    pub fn last(&self) -> Option<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}

// =============================================================================
// Session Guard
// =============================================================================

/// Drops the local session when the backend rejects the token.
#[derive(Clone)]
pub struct SessionGuard {
    credentials: CredentialStore,
    cart: CartStore,
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    pub fn new(credentials: CredentialStore, cart: CartStore, navigator: Arc<dyn Navigator>) -> Self {
        SessionGuard {
            credentials,
            cart,
            navigator,
        }
    }

    /// Clears the credential and the cart, then redirects to the login page.
    ///
    /// Storage failures are logged; the redirect happens regardless.
    pub fn handle_unauthorized(&self) {
        info!("Backend rejected the session, logging out");

        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "Failed to clear credential after 401");
        }
        if !self.cart.clear() {
            warn!("Failed to clear cart after 401");
        }

        self.navigator.redirect(LOGIN_ROUTE);
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("context", &self.cart.context())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pageturner_core::{Credential, LineItem, Money};
    use pageturner_store::Store;

    use super::*;

    #[test]
    fn test_unauthorized_clears_everything_and_redirects() {
        let store = Store::in_memory();
        let tab = store.open_context();
        tab.credentials().save(&Credential::new("tok", true)).unwrap();

        let mut cart = tab.cart().load();
        cart.upsert(LineItem::new("b1", "Dune", "Herbert", Money::from_cents(999), 2));
        assert!(tab.cart().save(&cart));

        let nav = RecordingNavigator::new();
        let guard = SessionGuard::new(
            tab.credentials().clone(),
            tab.cart().clone(),
            Arc::new(nav.clone()),
        );
        guard.handle_unauthorized();

        assert!(tab.credentials().load().is_none());
        assert!(tab.cart().load().is_empty());
        assert_eq!(nav.routes(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_recording_navigator_last() {
        let nav = RecordingNavigator::new();
        assert_eq!(nav.last(), None);
        nav.redirect("/a");
        nav.redirect("/b");
        assert_eq!(nav.last().as_deref(), Some("/b"));
    }
}
