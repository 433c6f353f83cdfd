//! # Change Notifier
//!
//! Tells every live context when a store key was written.
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Change Notification                                  │
//! │                                                                         │
//! │   Context A (writer)                 Context B                          │
//! │   ──────────────────                 ─────────                          │
//! │   CartStore::save()                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ChangeNotifier::publish(key, origin = A)                              │
//! │        │                                                                │
//! │        ├──► listeners in A  → ChangeKind::Local   ("cartUpdated")       │
//! │        ├──► listeners in B  → ChangeKind::Storage (storage event)       │
//! │        └──► broadcast channel → EventReceiver (kind relative to the     │
//! │                                 receiver's own context)                 │
//! │                                                                         │
//! │   Delivery is fire-and-forget: no ordering across writers, no acks.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listeners run synchronously on the publishing thread, after the write
//! has landed. They must not block.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Capacity of the async broadcast channel.
const CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Context Identity
// =============================================================================

/// Identifies one live view of the store (a tab, a window, a process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Allocates a fresh context id.
    pub fn new() -> Self {
        ContextId(Uuid::new_v4())
    }

    /// The origin used for writes observed from outside this process.
    pub const fn external() -> Self {
        ContextId(Uuid::nil())
    }

    /// Returns true for [`ContextId::external`].
    pub fn is_external(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_external() {
            write!(f, "external")
        } else {
            write!(f, "{}", self.0.simple())
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// How a listener learns about a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Written by another context.
    Storage,
    /// Written by the listener's own context.
    Local,
}

/// A store key changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    /// The key that was written or removed.
    pub key: String,
    /// The context that wrote it.
    pub origin: ContextId,
    /// Relative to the receiving context.
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

impl StoreEvent {
    /// Returns true if the event concerns `key`.
    pub fn is_for(&self, key: &str) -> bool {
        self.key == key
    }
}

/// What actually travels on the channel; `kind` is filled in per receiver.
#[derive(Debug, Clone)]
struct RawEvent {
    key: String,
    origin: ContextId,
    at: DateTime<Utc>,
}

impl RawEvent {
    fn view_from(&self, context: ContextId) -> StoreEvent {
        let kind = if self.origin == context {
            ChangeKind::Local
        } else {
            ChangeKind::Storage
        };
        StoreEvent {
            key: self.key.clone(),
            origin: self.origin,
            kind,
            at: self.at,
        }
    }
}

// =============================================================================
// Notifier
// =============================================================================

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

struct Registration {
    id: u64,
    context: ContextId,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Registration>,
}

/// Pub/sub hub for store changes. Clones share subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
    tx: broadcast::Sender<RawEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .field("receivers", &self.tx.receiver_count())
            .finish()
    }
}

impl ChangeNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        ChangeNotifier {
            registry: Arc::default(),
            tx,
        }
    }

    /// Registers a listener on behalf of `context`.
    ///
    /// The listener stays attached until the returned [`Subscription`] is
    /// dropped or unsubscribed.
    pub fn subscribe<F>(&self, context: ContextId, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = match self.registry.lock() {
            Ok(mut reg) => {
                reg.next_id += 1;
                let id = reg.next_id;
                reg.entries.push(Registration {
                    id,
                    context,
                    listener: Arc::new(listener),
                });
                id
            }
            Err(_) => {
                warn!(%context, "Notifier registry poisoned, listener not attached");
                0
            }
        };

        debug!(%context, id, "Listener subscribed");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Async receiver that sees every event from `context`'s point of view.
    pub fn channel(&self, context: ContextId) -> EventReceiver {
        EventReceiver {
            rx: self.tx.subscribe(),
            context,
        }
    }

    /// Announces that `key` was written by `origin`.
    pub fn publish(&self, key: &str, origin: ContextId) {
        let raw = RawEvent {
            key: key.to_string(),
            origin,
            at: Utc::now(),
        };

        // Snapshot so listeners can subscribe/unsubscribe re-entrantly
        let listeners: Vec<(ContextId, Listener)> = match self.registry.lock() {
            Ok(reg) => reg
                .entries
                .iter()
                .map(|r| (r.context, Arc::clone(&r.listener)))
                .collect(),
            Err(_) => {
                warn!(key, "Notifier registry poisoned, skipping listeners");
                Vec::new()
            }
        };

        debug!(key, %origin, listeners = listeners.len(), "Publishing store change");

        for (context, listener) in listeners {
            listener(&raw.view_from(context));
        }

        // No receivers is fine
        let _ = self.tx.send(raw);
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.lock().map(|r| r.entries.len()).unwrap_or(0)
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Detaches its listener when dropped.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Detaches the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut reg) = registry.lock() {
                reg.entries.retain(|r| r.id != self.id);
            }
        }
    }
}

// =============================================================================
// Async Receiver
// =============================================================================

/// Async stream of store events for one context.
pub struct EventReceiver {
    rx: broadcast::Receiver<RawEvent>,
    context: ContextId,
}

impl EventReceiver {
    /// Waits for the next event. Returns `None` once every notifier handle
    /// is gone.
    ///
    /// A receiver that falls behind skips the missed events; the store is
    /// re-read on the next one anyway.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.recv().await {
                Ok(raw) => return Some(raw.view_from(self.context)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, context = %self.context, "Event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(raw) => return Some(raw.view_from(self.context)),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, context = %self.context, "Event receiver lagged");
                }
                Err(_) => return None,
            }
        }
    }

    /// The context this receiver speaks for.
    pub fn context(&self) -> ContextId {
        self.context
    }
}
