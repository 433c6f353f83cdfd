//! # Store Watcher
//!
//! Notices writes made to a [`FileBackend`] directory by other processes and
//! republishes them as [`ChangeKind::Storage`](crate::ChangeKind) events.
//!
//! ## Watch Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StoreWatcher::run                                │
//! │                                                                         │
//! │   select! { biased;                                                     │
//! │     shutdown_rx       → stop                                            │
//! │                                                                         │
//! │     notifier event    → a context in THIS process wrote the key;        │
//! │     (origin != ext.)    refresh the snapshot silently so the write      │
//! │                         is not reported back as foreign                 │
//! │                                                                         │
//! │     interval.tick()   → read each watched key                           │
//! │                         changed since last look? → publish(external)    │
//! │   }                                                                     │
//! │                                                                         │
//! │   TIMING: poll interval is configurable (default 1 second)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::{FileBackend, KeyValueBackend};
use crate::error::{StoreError, StoreResult};
use crate::notifier::{ChangeNotifier, ContextId, EventReceiver};

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls store files for foreign writes.
pub struct StoreWatcher {
    backend: FileBackend,
    notifier: ChangeNotifier,
    events: EventReceiver,
    keys: Vec<String>,
    poll_interval: Duration,
    snapshot: HashMap<String, Option<String>>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running watcher.
#[derive(Clone)]
pub struct WatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl WatcherHandle {
    /// Stops the watcher loop.
    pub async fn shutdown(&self) -> StoreResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| StoreError::Internal("watcher already stopped".into()))
    }
}

impl StoreWatcher {
    /// Creates a watcher for `keys` and returns its handle.
    ///
    /// The current contents are the baseline; only later changes are
    /// reported.
    pub fn new(
        backend: FileBackend,
        notifier: ChangeNotifier,
        keys: &[&str],
        poll_interval: Duration,
    ) -> (Self, WatcherHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let events = notifier.channel(ContextId::external());

        let mut watcher = StoreWatcher {
            backend,
            notifier,
            events,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            poll_interval,
            snapshot: HashMap::new(),
            shutdown_rx,
        };
        for key in watcher.keys.clone() {
            let current = watcher.read(&key);
            watcher.snapshot.insert(key, current);
        }

        (watcher, WatcherHandle { shutdown_tx })
    }

    /// Runs the watch loop until shutdown.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(
            dir = %self.backend.dir().display(),
            keys = ?self.keys,
            "Store watcher starting"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            // Local events drain before a poll, or a write from this
            // process would be read back as foreign.
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("Store watcher shutting down");
                    break;
                }

                Some(event) = self.events.recv() => {
                    if !event.origin.is_external() && self.keys.contains(&event.key) {
                        let current = self.read(&event.key);
                        self.snapshot.insert(event.key, current);
                    }
                }

                _ = interval.tick() => {
                    self.poll();
                }
            }
        }

        info!("Store watcher stopped");
    }

    /// Compares every watched key against the snapshot once.
    fn poll(&mut self) {
        for key in self.keys.clone() {
            let current = self.read(&key);
            let previous = self.snapshot.get(&key).cloned().flatten();
            if current != previous {
                debug!(key = %key, "Detected foreign write");
                self.snapshot.insert(key.clone(), current);
                self.notifier.publish(&key, ContextId::external());
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Watcher failed to read key");
                self.snapshot.get(key).cloned().flatten()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pageturner_core::{Cart, LineItem, Money, CART_STORAGE_KEY};

    use super::*;
    use crate::notifier::ChangeKind;
    use crate::Store;

    #[tokio::test]
    async fn test_reports_foreign_write() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let notifier = ChangeNotifier::new();
        let me = ContextId::new();
        let mut rx = notifier.channel(me);

        let (watcher, handle) = StoreWatcher::new(
            backend.clone(),
            notifier.clone(),
            &[CART_STORAGE_KEY],
            Duration::from_millis(20),
        );
        let task = tokio::spawn(watcher.run());

        // Another process writes straight to the directory
        let other = FileBackend::open(dir.path()).unwrap();
        other.set(CART_STORAGE_KEY, "[]").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.key, CART_STORAGE_KEY);
        assert!(event.origin.is_external());
        assert_eq!(event.kind, ChangeKind::Storage);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_own_write_is_not_reported_as_foreign() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let store = Store::new(Arc::new(backend.clone()));
        let tab = store.open_context();
        let mut rx = store.notifier().channel(ContextId::new());

        let (watcher, handle) = StoreWatcher::new(
            backend,
            store.notifier().clone(),
            &[CART_STORAGE_KEY],
            Duration::from_millis(20),
        );
        let task = tokio::spawn(watcher.run());
        tokio::task::yield_now().await;

        let mut cart = Cart::new();
        cart.upsert(LineItem::new("a", "A", "", Money::from_cents(100), 1));
        assert!(tab.cart().save(&cart));

        // Block the runtime so the next tick is due alongside the queued event
        std::thread::sleep(Duration::from_millis(60));
        tokio::time::sleep(Duration::from_millis(100)).await;

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let mut seen = Vec::new();
        while let Some(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].origin, tab.context());
    }

    #[test]
    fn test_baseline_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set(CART_STORAGE_KEY, "[]").unwrap();

        let notifier = ChangeNotifier::new();
        let (mut watcher, _handle) = StoreWatcher::new(
            backend,
            notifier.clone(),
            &[CART_STORAGE_KEY],
            DEFAULT_POLL_INTERVAL,
        );

        let mut rx = notifier.channel(ContextId::new());
        watcher.poll();
        assert!(rx.try_recv().is_none());
    }
}
