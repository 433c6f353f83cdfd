//! # pageturner-sync: Remote Sync Client for PageTurner
//!
//! Talks to the bookstore REST backend and keeps the local session and cart
//! consistent with what the backend says.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       pageturner-sync                                   │
//! │                                                                         │
//! │   UI / CLI                                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │   Session ──────────────┬──────────────────┬───────────────────┐        │
//! │   (login/register/      │                  │                   │        │
//! │    logout, guard)       ▼                  ▼                   ▼        │
//! │                    ApiClient          CartProjector        BusyFlag     │
//! │                    (reqwest)          (in-memory cart)                  │
//! │                         │                  ▲                            │
//! │                 401 ──► SessionGuard       │ store events               │
//! │                         │  clear + /login  │                            │
//! │                         ▼                  │                            │
//! │                    ┌────────────────────────────────┐                   │
//! │                    │ pageturner-store (StoreHandle) │                   │
//! │                    └────────────────────────────────┘                   │
//! │                                                                         │
//! │   CartSync: remote cart first, projector second                         │
//! │   OpenLibraryClient: public search, no credential                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered client configuration
//! - [`client`] - HTTP plumbing and the 401 policy
//! - [`api`] - One module per backend resource
//! - [`session`] - Account flows for one context
//! - [`projector`] - In-memory cart kept equal to the store
//! - [`cart_sync`] - Server-side cart mirroring
//! - [`navigator`] - Redirect seam and forced logout
//! - [`busy`] - Duplicate-submission guard
//! - [`claims`] - Admin flag from the token payload
//! - [`error`] - Client error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod busy;
pub mod cart_sync;
pub mod claims;
pub mod client;
pub mod config;
pub mod error;
pub mod navigator;
pub mod projector;
pub mod session;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{OpenLibraryClient, OpenLibraryDoc};
pub use busy::{BusyFlag, BusyGuard};
pub use cart_sync::CartSync;
pub use client::ApiClient;
pub use config::{AuthScheme, ClientConfig, RoleSource};
pub use error::{ClientError, ClientResult};
pub use navigator::{Navigator, NoOpNavigator, RecordingNavigator, SessionGuard};
pub use projector::CartProjector;
pub use session::{HomeView, Session};
