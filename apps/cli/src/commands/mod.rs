//! # Commands Module
//!
//! One file per area, each a thin wrapper over `pageturner-sync`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (clap tree, guard, dispatch)
//! ├── books.rs    ◄─── Catalog browse + admin CRUD
//! ├── auth.rs     ◄─── login, register, logout, whoami
//! ├── cart.rs     ◄─── Local cart and server-side mirror
//! ├── orders.rs   ◄─── Order history
//! ├── search.rs   ◄─── Open Library search
//! └── watch.rs    ◄─── Cart changes from other processes
//! ```
//!
//! ## How a Command Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pageturner books delete b1                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  required_role(&command) ── Some(Admin)                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  session.guard(..) ── Redirect("/login") ──► CliError::Redirect, exit 2 │
//! │         │ Allow                                                         │
//! │         ▼                                                               │
//! │  books::run(..) ── 401 ──► SessionGuard clears, "→ /login", exit 3      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod books;
pub mod cart;
pub mod orders;
pub mod search;
pub mod watch;

use clap::Subcommand;
use serde::Serialize;
use tracing::debug;

use pageturner_core::{GuardDecision, RequiredRole};

use crate::error::{CliError, CliResult};
use crate::state::AppState;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the catalog; add, update and delete require admin.
    #[command(subcommand)]
    Books(books::BooksCommand),

    /// Sign in.
    Login(auth::LoginArgs),

    /// Create an account and sign in.
    Register(auth::RegisterArgs),

    /// Sign out and empty the cart.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Inspect or edit the cart.
    #[command(subcommand)]
    Cart(cart::CartCommand),

    /// Order history.
    Orders,

    /// Search Open Library.
    Search {
        /// Free-text query.
        query: String,
    },

    /// Print cart changes made by other processes until ctrl-c.
    Watch,
}

/// The role a command's view demands, mirroring the UI's route table.
pub fn required_role(command: &Command) -> Option<RequiredRole> {
    match command {
        Command::Books(books) => books.required_role(),
        Command::Cart(cart) => cart.required_role(),
        Command::Whoami | Command::Orders => Some(RequiredRole::Authenticated),
        Command::Login(_)
        | Command::Register(_)
        | Command::Logout
        | Command::Search { .. }
        | Command::Watch => None,
    }
}

/// Runs the route guard, then the command.
pub async fn dispatch(state: &AppState, command: Command, json: bool) -> CliResult<()> {
    guard(state, required_role(&command))?;

    match command {
        Command::Books(cmd) => books::run(state, cmd, json).await,
        Command::Login(args) => auth::login(state, args).await,
        Command::Register(args) => auth::register(state, args).await,
        Command::Logout => auth::logout(state).await,
        Command::Whoami => auth::whoami(state, json).await,
        Command::Cart(cmd) => cart::run(state, cmd, json).await,
        Command::Orders => orders::run(state, json).await,
        Command::Search { query } => search::run(state, &query, json).await,
        Command::Watch => watch::run(state).await,
    }
}

/// Fails with the guard's redirect, if any.
pub fn guard(state: &AppState, required: Option<RequiredRole>) -> CliResult<()> {
    match state.session.guard(required) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::Redirect(route) => {
            debug!(?required, route, "Route guard redirected");
            Err(CliError::Redirect(route))
        }
    }
}

/// Pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to encode output: {e}"),
    }
}
