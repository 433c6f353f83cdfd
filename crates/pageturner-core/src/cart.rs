//! # Cart Module
//!
//! The shopping cart as a pure value: line items keyed by book id.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation              Existing id              New id                 │
//! │  ─────────              ───────────              ──────                 │
//! │  add_book(book)         quantity += 1            push (quantity 1)      │
//! │  set_quantity(id, n>0)  quantity = n             NotInCart error        │
//! │  set_quantity(id, n<=0) remove                   no-op                  │
//! │  decrement(id)          quantity = max(1, q-1)   NotInCart error        │
//! │  remove(id)             remove                   no-op                  │
//! │                                                                         │
//! │  INVARIANTS                                                            │
//! │  • no two items share an id                                            │
//! │  • every quantity is > 0                                               │
//! │  • total() is computed on read and never stored                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Form
//! The cart serializes as a bare JSON array of line items. Deserializing
//! normalizes whatever was stored: non-positive quantities are dropped and
//! duplicate ids are merged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Book;

// =============================================================================
// Line Item
// =============================================================================

/// One book in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Book id (`_id` on the wire).
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub author: String,

    /// Unit price, frozen when the book was added.
    #[serde(rename = "price", alias = "unitPrice")]
    pub unit_price: Money,

    pub quantity: i64,
}

impl LineItem {
    /// Creates a line item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        LineItem {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            unit_price,
            quantity,
        }
    }

    /// Creates a single-unit line item from a catalog book.
    pub fn from_book(book: &Book) -> Self {
        LineItem::new(&book.id, &book.title, &book.author, book.price, 1)
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A set of line items with unique ids.
///
/// Insertion order is kept for stable display; it carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from raw items, restoring the invariants.
    ///
    /// Items with quantity ≤ 0 are dropped; repeated ids are merged by
    /// summing their quantities (the first occurrence wins for the rest of
    /// the fields).
    pub fn from_items(raw: Vec<LineItem>) -> Self {
        let mut cart = Cart::new();
        for item in raw.into_iter().filter(|i| i.quantity > 0) {
            match cart.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity)
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Returns the line items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line item by book id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns true if the book is in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Adds one unit of a book.
    ///
    /// An id already present has its quantity incremented by exactly one;
    /// it is never duplicated. Returns the new quantity.
    ///
    /// Fails only if the quantity is already `i64::MAX`.
    pub fn add_book(&mut self, book: &Book) -> CoreResult<i64> {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == book.id) {
            let new_qty = item
                .quantity
                .checked_add(1)
                .ok_or_else(|| CoreError::QuantityOverflow(book.id.clone()))?;
            item.quantity = new_qty;
            return Ok(new_qty);
        }

        self.items.push(LineItem::from_book(book));
        Ok(1)
    }

    /// Inserts or replaces a line item wholesale.
    ///
    /// A non-positive quantity removes the id instead.
    pub fn upsert(&mut self, item: LineItem) {
        if item.quantity <= 0 {
            self.remove(&item.id);
            return;
        }
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Sets the quantity of an item. `quantity <= 0` removes it.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(id);
            return Ok(());
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::NotInCart(id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Lowers the quantity by one, never below one.
    ///
    /// Removal is always an explicit [`Cart::remove`].
    pub fn decrement(&mut self, id: &str) -> CoreResult<i64> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::NotInCart(id.to_string()))?;
        item.quantity = (item.quantity - 1).max(1);
        Ok(item.quantity)
    }

    /// Removes an item. Returns the removed item, if it was present.
    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Clears all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct books.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities (the badge count).
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |sum, i| sum.saturating_add(i.quantity))
    }

    /// Σ(unit price × quantity).
    pub fn total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Cart::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
