//! # pageturner-store: Local Persistence for PageTurner
//!
//! Holds what survives between runs (the cart and the session credential)
//! and tells every live context when either changes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PageTurner Local State                             │
//! │                                                                         │
//! │  CartProjector (ctx A)        CartProjector (ctx B)      other process  │
//! │       │      ▲                     │      ▲                   │         │
//! │       ▼      │ Local               ▼      │ Storage           │         │
//! │  ┌───────────┴─────────────────────┴──────┴───────────────┐   │         │
//! │  │               pageturner-store (THIS CRATE)            │   │         │
//! │  │                                                        │   │         │
//! │  │  StoreHandle ─► CartStore / CredentialStore            │   │         │
//! │  │       │                │                               │   │         │
//! │  │       │                ▼                               │   │         │
//! │  │       │         KeyValueBackend ◄──── StoreWatcher ◄───┼───┘         │
//! │  │       │        (Memory | File)        (polls files)    │             │
//! │  │       ▼                                                │             │
//! │  │  ChangeNotifier (listeners + broadcast channel)        │             │
//! │  └────────────────────────────────────────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - `KeyValueBackend` trait, memory and file backends
//! - [`notifier`] - Cross-context change events
//! - [`cart_store`] - Fail-soft cart persistence
//! - [`credential_store`] - Token + admin flag persistence
//! - [`watcher`] - Detects writes by other processes
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust
//! use pageturner_store::Store;
//!
//! let store = Store::in_memory();
//! let tab_a = store.open_context();
//! let tab_b = store.open_context();
//!
//! let cart = tab_a.cart().load();
//! assert!(cart.is_empty());
//! tab_a.cart().save(&cart);
//! assert_eq!(tab_b.cart().load(), cart);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod cart_store;
pub mod credential_store;
pub mod error;
pub mod notifier;
pub mod watcher;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use cart_store::CartStore;
pub use credential_store::CredentialStore;
pub use error::{StoreError, StoreResult};
pub use notifier::{ChangeKind, ChangeNotifier, ContextId, EventReceiver, StoreEvent, Subscription};
pub use watcher::{StoreWatcher, WatcherHandle};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

// =============================================================================
// Store
// =============================================================================

/// A backend plus the notifier shared by everything that reads it.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KeyValueBackend>,
    notifier: ChangeNotifier,
}

impl Store {
    /// Wraps an arbitrary backend.
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Store {
            backend,
            notifier: ChangeNotifier::new(),
        }
    }

    /// A store that lives only as long as this process.
    pub fn in_memory() -> Self {
        Store::new(Arc::new(MemoryBackend::new()))
    }

    /// A store persisted under `dir`, shared with other processes.
    pub fn open_dir(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        Ok(Store::new(Arc::new(FileBackend::open(dir)?)))
    }

    /// Opens a new context (a "tab") on this store.
    pub fn open_context(&self) -> StoreHandle {
        let context = ContextId::new();
        debug!(%context, "Opened store context");
        StoreHandle {
            context,
            cart: CartStore::new(Arc::clone(&self.backend), self.notifier.clone(), context),
            credentials: CredentialStore::new(
                Arc::clone(&self.backend),
                self.notifier.clone(),
                context,
            ),
            notifier: self.notifier.clone(),
        }
    }

    /// The shared notifier.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// The raw backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }
}

// =============================================================================
// Store Handle
// =============================================================================

/// One context's view of the store.
#[derive(Clone)]
pub struct StoreHandle {
    context: ContextId,
    cart: CartStore,
    credentials: CredentialStore,
    notifier: ChangeNotifier,
}

impl StoreHandle {
    /// This handle's context id.
    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Subscribes a listener on behalf of this context.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(self.context, listener)
    }

    /// Async event stream seen from this context.
    pub fn events(&self) -> EventReceiver {
        self.notifier.channel(self.context)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pageturner_core::{Credential, LineItem, Money, CART_STORAGE_KEY};

    use super::*;

    #[test]
    fn test_contexts_share_backend_and_notifier() {
        let store = Store::in_memory();
        let a = store.open_context();
        let b = store.open_context();
        assert_ne!(a.context(), b.context());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = b.subscribe(move |e| sink.lock().unwrap().push((e.key.clone(), e.kind)));

        let mut cart = a.cart().load();
        cart.upsert(LineItem::new("x", "X", "Y", Money::from_cents(100), 1));
        a.cart().save(&cart);

        assert_eq!(b.cart().load(), cart);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(CART_STORAGE_KEY.to_string(), ChangeKind::Storage)]
        );
    }

    #[test]
    fn test_file_store_shared_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let first = Store::open_dir(dir.path()).unwrap().open_context();
        first
            .credentials()
            .save(&Credential::new("tok", false))
            .unwrap();

        // A second "process" opening the same directory
        let second = Store::open_dir(dir.path()).unwrap().open_context();
        assert_eq!(second.credentials().load(), Some(Credential::user("tok")));
    }
}
