//! # Busy Flag
//!
//! Keeps a form from being submitted twice while its request is in flight.
//! The flag is held by a [`BusyGuard`] and released when the guard drops,
//! whether the request succeeded, failed, or the future was abandoned.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// A shared "request in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag. `None` if someone already holds it.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Returns true while a guard is alive.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Runs `fut` while holding the flag, or fails with
    /// [`ClientError::Busy`] without polling it.
    pub async fn guarded<F, T>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let Some(_guard) = self.try_begin() else {
            debug!("Rejected duplicate submission");
            return Err(ClientError::Busy);
        };
        fut.await
    }
}

/// Releases the [`BusyFlag`] on drop.
#[must_use = "the flag is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
