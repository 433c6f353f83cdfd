//! # Money Module
//!
//! Monetary values as integer cents.
//!
//! ## Wire Format vs. Internal Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Money Crosses Boundaries                       │
//! │                                                                         │
//! │  REST backend JSON        Money (internal)          Display             │
//! │  ─────────────────        ────────────────          ───────             │
//! │  "price": 29.99   ──────► Money(2999)      ──────►  "$29.99"            │
//! │  "price": "29.99" ──────► Money(2999)                                   │
//! │  "price": 30      ──────► Money(3000)                                   │
//! │                                                                         │
//! │  Parsing goes through rust_decimal, never through f64 arithmetic,      │
//! │  so 0.1 + 0.2 style drift cannot reach the cart total.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use pageturner_core::money::Money;
//!
//! let price = Money::from_cents(1099);        // $10.99
//! let doubled = price * 2;                    // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//! assert_eq!(total.to_string(), "$15.99");
//! assert_eq!(doubled.cents(), 2198);
//! ```

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Serialized as a JSON decimal number (`29.99`) because that is what the
/// bookstore backend sends and expects. Deserialization also accepts
/// integers and numeric strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units.
    ///
    /// Amounts with more than two decimal places are rounded half away
    /// from zero.
    ///
    /// ```rust
    /// use pageturner_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let m = Money::from_decimal(Decimal::new(1999, 2)).unwrap();
    /// assert_eq!(m.cents(), 1999);
    /// ```
    pub fn from_decimal(amount: Decimal) -> CoreResult<Self> {
        amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| CoreError::InvalidPrice(amount.to_string()))
    }

    /// Returns the value as a decimal amount in major units.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a line item quantity, saturating at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, quantity: i64) -> Money {
        Money(self.0.saturating_mul(quantity))
    }
}

impl FromStr for Money {
    type Err = CoreError;

    /// Parses `"29.99"`, `"30"` or `"1.5e1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('$');
        let amount = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| CoreError::InvalidPrice(s.to_string()))?;
        Money::from_decimal(amount)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_decimal().to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(serde::ser::Error::custom("price out of range")),
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal price as number or string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(100)
                    .map(Money)
                    .ok_or_else(|| E::custom(format!("price out of range: {v}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map_err(|_| E::custom(format!("price out of range: {v}")))
                    .and_then(|v| self.visit_i64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                let amount = Decimal::from_f64(v)
                    .ok_or_else(|| E::custom(format!("price out of range: {v}")))?;
                Money::from_decimal(amount).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates: prices come from the backend and the persisted
// cart, so no input may panic or wrap a total.

/// Display shows money as `$12.34`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
