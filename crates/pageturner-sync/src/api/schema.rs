//! # Wire Schemas
//!
//! One request or response shape per endpoint. Variant payloads the backend
//! has emitted over time are accepted here and normalized into the core
//! types, so nothing past this module sees a raw response.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /books                                                             │
//! │    [ Book, ... ]                                       → Page::single   │
//! │    { items, currentPage, totalPages, totalCount }      → Page           │
//! │    { books, currentPage, totalPages, total }           → Page           │
//! │    anything else                                       → Decode error   │
//! │                                                                         │
//! │  GET /cart/count                                                        │
//! │    { count } | 3                                        → u64           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pageturner_core::{Book, LineItem, Page};

// =============================================================================
// Requests
// =============================================================================

/// `POST /auth/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/register`
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `PUT /cart/:id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

/// Query string of `GET /books`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

// =============================================================================
// Responses
// =============================================================================

/// Login and registration answer with a token (or, on a broken backend,
/// without one).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenResponse {
    /// The token, if present and non-empty.
    pub fn into_token(self) -> Option<String> {
        self.token.filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsPage {
    pub items: Vec<Book>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooksPage {
    pub books: Vec<Book>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Every catalog listing shape the backend has produced.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BookPageWire {
    Bare(Vec<Book>),
    Items(ItemsPage),
    Books(BooksPage),
}

fn page_of(
    items: Vec<Book>,
    current: Option<u32>,
    pages: Option<u32>,
    count: Option<u64>,
) -> Page<Book> {
    let total_count = count.unwrap_or(items.len() as u64);
    let current_page = current.unwrap_or(1).max(1);
    Page {
        items,
        current_page,
        total_pages: pages.unwrap_or(current_page).max(current_page),
        total_count,
    }
}

impl From<BookPageWire> for Page<Book> {
    fn from(wire: BookPageWire) -> Self {
        match wire {
            BookPageWire::Bare(items) => Page::single(items),
            BookPageWire::Items(p) => page_of(p.items, p.current_page, p.total_pages, p.total_count),
            BookPageWire::Books(p) => page_of(p.books, p.current_page, p.total_pages, p.total),
        }
    }
}

/// `GET /cart/count`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountWire {
    Object { count: u64 },
    Bare(u64),
}

impl CountWire {
    pub fn count(&self) -> u64 {
        match self {
            CountWire::Object { count } | CountWire::Bare(count) => *count,
        }
    }
}

/// `GET /cart`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemoteCartWire {
    Bare(Vec<LineItem>),
    Wrapped { items: Vec<LineItem> },
}

impl RemoteCartWire {
    pub fn into_items(self) -> Vec<LineItem> {
        match self {
            RemoteCartWire::Bare(items) | RemoteCartWire::Wrapped { items } => items,
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Looks at `msg`, then `message`, then `error`, then the first entry of an
/// `errors` array.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    for key in ["msg", "message", "error"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }

    value
        .get("errors")?
        .as_array()?
        .first()?
        .get("msg")?
        .as_str()
        .map(str::to_string)
}

// =============================================================================
// Open Library
// =============================================================================

/// `GET https://openlibrary.org/search.json?q=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenLibraryResponse {
    #[serde(default)]
    pub docs: Vec<OpenLibraryDoc>,
    #[serde(default)]
    pub num_found: u64,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenLibraryDoc {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub author_name: Vec<String>,
    #[serde(default)]
    pub cover_i: Option<u64>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
}

impl OpenLibraryDoc {
    /// Medium cover image URL, if the work has a cover.
    pub fn cover_url(&self, covers_base: &str) -> Option<String> {
        self.cover_i
            .map(|id| format!("{}/b/id/{}-M.jpg", covers_base.trim_end_matches('/'), id))
    }

    /// Authors joined for display, or "Unknown".
    pub fn authors(&self) -> String {
        if self.author_name.is_empty() {
            "Unknown".to_string()
        } else {
            self.author_name.join(", ")
        }
    }
}
