//! # Cart Projector
//!
//! The in-memory cart one context renders from, kept equal to the persisted
//! cart.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item / remove_item / set_quantity / decrement / clear / replace   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  lock ─► re-read CartStore ─► apply change ─► snapshot ─► unlock        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  CartStore::save(snapshot)                                              │
//! │        ├──► this context:   Local event   → projector reloads (no-op)   │
//! │        └──► other contexts: Storage event → their projectors reload     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is saved with the lock released: the save publishes
//! synchronously and this projector's own listener takes the lock.
//!
//! A save the backend rejects (quota, I/O) drops the change: the projector
//! goes back to whatever is persisted, so the two never drift apart.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use pageturner_core::{Book, Cart, CoreResult, LineItem, Money, CART_STORAGE_KEY};
use pageturner_store::{CartStore, StoreEvent, StoreHandle, Subscription};

/// Live view of the persisted cart for one context.
pub struct CartProjector {
    store: CartStore,
    cart: Arc<Mutex<Cart>>,
    _subscription: Subscription,
}

fn lock(cart: &Mutex<Cart>) -> MutexGuard<'_, Cart> {
    cart.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reload(store: &CartStore, cart: &Mutex<Cart>, event: &StoreEvent) {
    if event.is_for(CART_STORAGE_KEY) {
        let fresh = store.load();
        debug!(kind = ?event.kind, origin = %event.origin, items = fresh.item_count(), "Cart changed, reloading");
        *lock(cart) = fresh;
    }
}

impl CartProjector {
    /// Loads the persisted cart and starts following changes to it.
    pub fn mount(handle: &StoreHandle) -> Self {
        let store = handle.cart().clone();
        let cart = Arc::new(Mutex::new(store.load()));

        let listener_store = store.clone();
        let listener_cart = Arc::clone(&cart);
        let subscription = handle.subscribe(move |event| {
            reload(&listener_store, &listener_cart, event);
        });

        CartProjector {
            store,
            cart,
            _subscription: subscription,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn mutate<T>(&self, change: impl FnOnce(&mut Cart) -> CoreResult<T>) -> CoreResult<T> {
        let (result, snapshot) = {
            let _cart = lock(&self.cart);
            let mut fresh = self.store.load();
            let result = change(&mut fresh)?;
            (result, fresh)
        };

        if self.store.save(&snapshot) {
            *lock(&self.cart) = snapshot;
        } else {
            warn!(
                context = %self.store.context(),
                "Cart change not persisted, keeping stored cart"
            );
            *lock(&self.cart) = self.store.load();
        }
        Ok(result)
    }

    /// Adds one unit of `book`. Returns the new quantity.
    pub fn add_item(&self, book: &Book) -> CoreResult<i64> {
        self.mutate(|cart| cart.add_book(book))
    }

    /// Inserts or replaces a line item as-is.
    pub fn upsert(&self, item: LineItem) {
        // Infallible change
        let _ = self.mutate(|cart| {
            cart.upsert(item);
            Ok(())
        });
    }

    /// Removes a line. Returns it if it was present.
    pub fn remove_item(&self, id: &str) -> Option<LineItem> {
        self.mutate(|cart| Ok(cart.remove(id))).ok().flatten()
    }

    /// Sets a line's quantity; zero or less removes the line.
    pub fn set_quantity(&self, id: &str, quantity: i64) -> CoreResult<()> {
        self.mutate(|cart| cart.set_quantity(id, quantity))
    }

    /// Lowers a line's quantity by one, never below one.
    pub fn decrement(&self, id: &str) -> CoreResult<i64> {
        self.mutate(|cart| cart.decrement(id))
    }

    /// Empties the cart.
    pub fn clear(&self) {
        let _ = self.mutate(|cart| {
            cart.clear();
            Ok(())
        });
    }

    /// Replaces the whole cart, e.g. with the server's copy.
    pub fn replace(&self, cart: Cart) {
        let _ = self.mutate(move |current| {
            *current = cart;
            Ok(())
        });
    }

    // =========================================================================
    // Store Events
    // =========================================================================

    /// Re-reads the persisted cart.
    pub fn refresh(&self) {
        *lock(&self.cart) = self.store.load();
    }

    /// Reloads if `event` concerns the cart. The projector already does this
    /// for events from its own notifier; this is for events from elsewhere.
    pub fn on_store_event(&self, event: &StoreEvent) {
        reload(&self.store, &self.cart, event);
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        lock(&self.cart).clone()
    }

    pub fn items(&self) -> Vec<LineItem> {
        lock(&self.cart).items().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<LineItem> {
        lock(&self.cart).get(id).cloned()
    }

    /// Sum of price × quantity, computed on read.
    pub fn total(&self) -> Money {
        lock(&self.cart).total()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        lock(&self.cart).item_count()
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        lock(&self.cart).total_quantity()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.cart).is_empty()
    }
}

impl std::fmt::Debug for CartProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cart = lock(&self.cart);
        f.debug_struct("CartProjector")
            .field("context", &self.store.context())
            .field("items", &cart.item_count())
            .field("total", &cart.total())
            .finish()
    }
}
