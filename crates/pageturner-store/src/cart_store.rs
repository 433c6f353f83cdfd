//! # Cart Store
//!
//! Persists the cart under the `cart` key as a JSON array of line items.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load()                                                                 │
//! │  ├── key missing            → empty cart                                │
//! │  ├── backend error          → empty cart   (warn)                       │
//! │  ├── not valid JSON array   → empty cart   (warn)                       │
//! │  └── bad quantities / dups  → normalized   (Cart::from_items)           │
//! │                                                                         │
//! │  save()                                                                 │
//! │  ├── ok                     → publish change                            │
//! │  └── backend error (quota)  → swallowed    (warn), nothing published    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The cart is never worth crashing a view over.

use std::sync::Arc;

use pageturner_core::{Cart, CART_STORAGE_KEY};
use tracing::{debug, warn};

use crate::backend::KeyValueBackend;
use crate::notifier::{ChangeNotifier, ContextId};

/// Cart persistence bound to one context.
#[derive(Clone)]
pub struct CartStore {
    backend: Arc<dyn KeyValueBackend>,
    notifier: ChangeNotifier,
    context: ContextId,
}

impl CartStore {
    /// Creates a cart store writing on behalf of `context`.
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        notifier: ChangeNotifier,
        context: ContextId,
    ) -> Self {
        CartStore {
            backend,
            notifier,
            context,
        }
    }

    /// Reads the persisted cart. Never fails.
    pub fn load(&self) -> Cart {
        let raw = match self.backend.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                debug!(items = cart.item_count(), "Loaded cart");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Persisted cart is corrupt, starting empty");
                Cart::new()
            }
        }
    }

    /// Overwrites the persisted cart and notifies other contexts.
    ///
    /// Returns whether the write landed; failures are logged, not raised.
    pub fn save(&self, cart: &Cart) -> bool {
        let json = match serde_json::to_string(cart) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return false;
            }
        };

        if let Err(e) = self.backend.set(CART_STORAGE_KEY, &json) {
            warn!(error = %e, quota = e.is_quota(), "Failed to persist cart");
            return false;
        }

        debug!(
            items = cart.item_count(),
            total = %cart.total(),
            context = %self.context,
            "Saved cart"
        );
        self.notifier.publish(CART_STORAGE_KEY, self.context);
        true
    }

    /// Removes the persisted cart.
    pub fn clear(&self) -> bool {
        if let Err(e) = self.backend.remove(CART_STORAGE_KEY) {
            warn!(error = %e, "Failed to clear cart");
            return false;
        }
        self.notifier.publish(CART_STORAGE_KEY, self.context);
        true
    }

    /// The context this store writes for.
    pub fn context(&self) -> ContextId {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pageturner_core::{LineItem, Money};

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::notifier::ChangeKind;

    fn store_on(backend: MemoryBackend) -> CartStore {
        CartStore::new(Arc::new(backend), ChangeNotifier::new(), ContextId::new())
    }

    fn sample() -> Cart {
        let mut cart = Cart::new();
        cart.upsert(LineItem::new("a", "A", "X", Money::from_cents(1000), 2));
        cart
    }

    #[test]
    fn test_missing_key_is_empty() {
        assert!(store_on(MemoryBackend::new()).load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = store_on(MemoryBackend::new());
        assert!(store.save(&sample()));
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let backend = MemoryBackend::new();
        backend.set(CART_STORAGE_KEY, "{not json").unwrap();
        assert!(store_on(backend.clone()).load().is_empty());

        backend.set(CART_STORAGE_KEY, r#"{"items":"nope"}"#).unwrap();
        assert!(store_on(backend.clone()).load().is_empty());

        backend
            .set(CART_STORAGE_KEY, r#"[{"_id":"a","title":"A"}]"#)
            .unwrap();
        assert!(store_on(backend).load().is_empty());
    }

    #[test]
    fn test_out_of_range_price_loads_empty() {
        let backend = MemoryBackend::new();
        backend
            .set(CART_STORAGE_KEY, r#"[{"_id":"a","title":"A","price":1e28,"quantity":1}]"#)
            .unwrap();
        assert!(store_on(backend.clone()).load().is_empty());

        backend
            .set(CART_STORAGE_KEY, r#"[{"_id":"a","title":"A","price":"1e28","quantity":1}]"#)
            .unwrap();
        assert!(store_on(backend).load().is_empty());
    }

    #[test]
    fn test_huge_line_total_loads_with_saturated_total() {
        let backend = MemoryBackend::new();
        backend
            .set(
                CART_STORAGE_KEY,
                r#"[{"_id":"a","title":"A","price":900000000000000,"quantity":999}]"#,
            )
            .unwrap();

        let cart = store_on(backend).load();
        assert_eq!(cart.get("a").unwrap().quantity, 999);
        assert_eq!(cart.total(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_quota_failure_is_swallowed() {
        let store = store_on(MemoryBackend::with_quota(4));
        assert!(!store.save(&sample()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_publishes_local_event() {
        let notifier = ChangeNotifier::new();
        let context = ContextId::new();
        let store = CartStore::new(Arc::new(MemoryBackend::new()), notifier.clone(), context);

        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        let _sub = notifier.subscribe(context, move |e| sink.lock().unwrap().push(e.kind));

        store.save(&sample());
        store.clear();

        assert_eq!(*kinds.lock().unwrap(), vec![ChangeKind::Local, ChangeKind::Local]);
        assert!(store.load().is_empty());
    }
}
