//! # Backend Endpoints
//!
//! Each submodule adds the methods for one resource to [`ApiClient`]
//! (`impl ApiClient` blocks), so callers hold a single client.
//!
//! - [`books`] - catalog listing and admin CRUD
//! - [`auth`] - login, registration, profile, logout
//! - [`cart`] - server-side cart
//! - [`orders`] - order history
//! - [`open_library`] - Open Library search (separate host, no credential)
//! - [`schema`] - request/response shapes
//!
//! [`ApiClient`]: crate::client::ApiClient

pub mod auth;
pub mod books;
pub mod cart;
pub mod open_library;
pub mod orders;
pub mod schema;

pub use open_library::OpenLibraryClient;
pub use schema::OpenLibraryDoc;
