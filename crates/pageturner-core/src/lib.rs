//! # pageturner-core: Pure Business Logic for PageTurner
//!
//! This crate holds the bookstore client's domain model and every rule that
//! can be decided without touching storage or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PageTurner Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front-end (CLI / web UI)                      │   │
//! │  │    Books ──► Cart ──► Orders ──► Admin book management          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        pageturner-sync (REST client, session, projector)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ pageturner-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   guard   │  │   │
//! │  │   │   Book    │  │   Money   │  │   Cart    │  │  allow /  │  │   │
//! │  │   │   Order   │  │ wire fmt  │  │ LineItem  │  │  redirect │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog and order types (Book, Order, Page, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart and LineItem with the quantity invariant
//! - [`credential`] - Stored token + admin flag
//! - [`guard`] - Route guard decisions
//! - [`error`] - Domain error types
//! - [`validation`] - Form validation run before submission
//!
//! ## Example Usage
//!
//! ```rust
//! use pageturner_core::{Cart, LineItem, Money};
//!
//! let mut cart = Cart::new();
//! cart.upsert(LineItem::new("b1", "Dune", "Frank Herbert", Money::from_cents(1000), 2));
//! cart.upsert(LineItem::new("b2", "Emma", "Jane Austen", Money::from_cents(500), 1));
//!
//! assert_eq!(cart.total().to_string(), "$25.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod credential;
pub mod error;
pub mod guard;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, LineItem};
pub use credential::Credential;
pub use error::{CoreError, CoreResult, ValidationError};
pub use guard::{guard, GuardDecision, RequiredRole};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Store key holding the JSON-serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Store key holding the opaque auth token.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Store key holding the admin flag (`"true"` / `"false"`).
pub const ADMIN_FLAG_STORAGE_KEY: &str = "isAdmin";

/// Name of the same-context event raised after a cart mutation.
pub const CART_UPDATED_EVENT: &str = "cartUpdated";

/// Login entry point. Unauthenticated users and 401 responses land here.
pub const LOGIN_ROUTE: &str = "/login";

/// Landing route for authenticated non-admin users who hit an admin page.
pub const HOME_ROUTE: &str = "/";

/// Landing route after an admin logs in.
pub const ADMIN_ROUTE: &str = "/admin";

/// Landing route after a regular user logs in.
pub const PROFILE_ROUTE: &str = "/profile";

/// Default page size for catalog listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 12;
