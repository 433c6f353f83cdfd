//! # Domain Types
//!
//! Catalog, order and account types shared by every PageTurner crate.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │      Order      │   │    Page<T>      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (_id)       │   │  id (_id)       │   │  items          │       │
//! │  │  title, author  │   │  items          │   │  current_page   │       │
//! │  │  isbn           │   │  total_amount   │   │  total_pages    │       │
//! │  │  price (Money)  │   │  status         │   │  total_count    │       │
//! │  │  stock_quantity │   │  created_at     │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  Books are owned by the backend. The client only holds transient pages │
//! │  of them; nothing here is persisted locally except cart line items.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Book
// =============================================================================

/// A catalog entry as served by `GET /books`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Book {
    /// Backend identifier (`_id` on the wire).
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub title: String,

    pub author: String,

    #[serde(default)]
    pub isbn: String,

    pub price: Money,

    /// Units in stock.
    #[serde(default)]
    pub stock_quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Book {
    /// Returns true if at least one unit is in stock.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// The editable fields of a book, sent by the admin panel on create/update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Money,
    pub stock_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        BookDraft {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            price: book.price,
            stock_quantity: book.stock_quantity,
            description: book.description.clone(),
            cover_image: book.cover_image.clone(),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a paginated listing.
///
/// The backend has answered with several shapes over time; the sync crate
/// normalizes all of them into this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Wraps a complete, unpaginated list as a single page.
    pub fn single(items: Vec<T>) -> Self {
        let total_count = items.len() as u64;
        Page {
            items,
            current_page: 1,
            total_pages: 1,
            total_count,
        }
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Returns true if an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Fulfilment status of an order.
///
/// The backend uses free-form strings; the two it actually emits are
/// modelled and anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(from = "String", into = "String")]
#[ts(export, type = "string")]
pub enum OrderStatus {
    Processing,
    Completed,
    Other(String),
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Processing" => OrderStatus::Processing,
            "Completed" => OrderStatus::Completed,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A line of a placed order (frozen at checkout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub price: Money,
    pub quantity: i64,
}

impl OrderItem {
    /// Price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A placed order as returned by `GET /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub items: Vec<OrderItem>,
    /// Total as charged by the backend (not recomputed).
    pub total_amount: Money,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Accounts
// =============================================================================

/// The signed-in user as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_from_backend_json() {
        let json = r#"{
            "_id": "65f1",
            "title": "Dune",
            "author": "Frank Herbert",
            "description": "Spice",
            "isbn": "9780441013593",
            "price": 9.99,
            "stockQuantity": 4
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "65f1");
        assert_eq!(book.price.cents(), 999);
        assert_eq!(book.stock_quantity, 4);
        assert!(book.cover_image.is_none());
        assert!(book.in_stock());
    }

    #[test]
    fn test_book_accepts_plain_id() {
        let json = r#"{"id":"7","title":"T","author":"A","price":"1.50"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "7");
        assert_eq!(book.price.cents(), 150);
        assert!(!book.in_stock());
    }

    #[test]
    fn test_page_navigation() {
        let page = Page {
            items: vec![1, 2, 3],
            current_page: 2,
            total_pages: 3,
            total_count: 30,
        };
        assert!(page.has_next());
        assert!(page.has_previous());

        let single = Page::single(vec!["a", "b"]);
        assert_eq!(single.total_count, 2);
        assert!(!single.has_next());
        assert!(!single.has_previous());
    }

    #[test]
    fn test_order_status_round_trip() {
        let order_json = r#"{
            "_id": "o1",
            "items": [{"_id": "b1", "title": "Dune", "price": 10, "quantity": 2}],
            "totalAmount": 20,
            "status": "Shipped",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(order_json).unwrap();
        assert_eq!(order.status, OrderStatus::Other("Shipped".into()));
        assert_eq!(order.items[0].line_total().cents(), 2000);

        let status: OrderStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(status, OrderStatus::Completed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Completed\"");
    }

    #[test]
    fn test_user_profile_defaults_to_non_admin() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        assert!(!profile.is_admin);
        assert_eq!(profile.name.as_deref(), Some("Ann"));
    }
}
