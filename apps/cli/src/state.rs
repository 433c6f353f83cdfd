//! # CLI State
//!
//! What every command gets: the loaded config, the on-disk store, and one
//! [`Session`] acting as this process's context.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState                                                               │
//! │                                                                         │
//! │   config ──► data_dir ──► FileBackend ──► Store ──► open_context()      │
//! │                               │                          │              │
//! │                               │                          ▼              │
//! │                               │                  Session (navigator =   │
//! │                               │                   TerminalNavigator)    │
//! │                               ▼                                         │
//! │                        StoreWatcher (`pageturner watch` only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use pageturner_store::{FileBackend, Store};
use pageturner_sync::{ClientConfig, Navigator, Session};

use crate::error::CliResult;

/// Prints where the UI would navigate.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, route: &str) {
        debug!(route, "Navigate");
        eprintln!("→ {route}");
    }
}

pub struct AppState {
    pub config: ClientConfig,
    pub backend: FileBackend,
    pub store: Store,
    pub session: Session,
}

impl AppState {
    /// Opens the store under the configured data dir and builds the session.
    pub fn open(config: ClientConfig) -> CliResult<Self> {
        let data_dir = config.data_dir();
        let backend = FileBackend::open(data_dir.clone())?;
        let store = Store::new(Arc::new(backend.clone()));
        info!(data_dir = %data_dir.display(), "Store opened");

        let session = Session::new(
            config.clone(),
            store.open_context(),
            Arc::new(TerminalNavigator),
        )?;

        Ok(AppState {
            config,
            backend,
            store,
            session,
        })
    }
}
