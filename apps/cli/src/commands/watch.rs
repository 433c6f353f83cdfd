//! # Watch Command
//!
//! Runs a [`StoreWatcher`] over the data dir and prints every cart or
//! sign-in change another process makes, until ctrl-c.
//!
//! ```text
//!   other process ──writes──► data_dir/cart
//!                                  │ (poll)
//!                                  ▼
//!   StoreWatcher ──publish(external)──► notifier ──► this context
//!                                                      │ kind = Storage
//!                                                      ▼
//!                                            projector reloads, line printed
//! ```

use tracing::{info, warn};

use pageturner_core::{ADMIN_FLAG_STORAGE_KEY, CART_STORAGE_KEY, TOKEN_STORAGE_KEY};
use pageturner_store::{ChangeKind, StoreEvent, StoreWatcher};
use pageturner_sync::CartProjector;

use crate::error::CliResult;
use crate::state::AppState;

pub async fn run(state: &AppState) -> CliResult<()> {
    let (watcher, handle) = StoreWatcher::new(
        state.backend.clone(),
        state.store.notifier().clone(),
        &[CART_STORAGE_KEY, TOKEN_STORAGE_KEY, ADMIN_FLAG_STORAGE_KEY],
        state.config.watch_interval(),
    );
    let task = tokio::spawn(watcher.run());

    let projector = state.session.projector();
    let mut events = state.session.store().events();
    println!(
        "Watching {} (ctrl-c to stop)",
        state.backend.dir().display()
    );
    print_cart_line(&projector);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }

            event = events.recv() => {
                let Some(event) = event else { break };
                if event.kind == ChangeKind::Storage {
                    report(state, &projector, &event);
                }
            }
        }
    }

    if let Err(e) = handle.shutdown().await {
        warn!(error = %e, "Watcher already stopped");
    }
    if let Err(e) = task.await {
        warn!(error = %e, "Watcher task failed");
    }
    Ok(())
}

fn report(state: &AppState, projector: &CartProjector, event: &StoreEvent) {
    if event.is_for(CART_STORAGE_KEY) {
        projector.on_store_event(event);
        print_cart_line(projector);
    } else {
        let view = state.session.home_view();
        println!(
            "[{}] {}",
            event.at.format("%H:%M:%S"),
            match (view.logged_in, view.is_admin) {
                (false, _) => "signed out",
                (true, false) => "signed in",
                (true, true) => "signed in (admin)",
            }
        );
    }
}

fn print_cart_line(projector: &CartProjector) {
    println!(
        "cart: {} line(s), {} item(s), total {}",
        projector.item_count(),
        projector.total_quantity(),
        projector.total()
    );
}
