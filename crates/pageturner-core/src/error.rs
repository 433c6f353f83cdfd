//! # Error Types
//!
//! Domain-specific error types for pageturner-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pageturner-core errors (this file)                                    │
//! │  ├── CoreError        - Cart and money rule violations                 │
//! │  └── ValidationError  - Form input failures (caught before submit)     │
//! │                                                                         │
//! │  pageturner-store errors                                               │
//! │  └── StoreError       - Backend read/write failures                    │
//! │                                                                         │
//! │  pageturner-sync errors                                                │
//! │  └── ClientError      - What the UI shows (network/server/auth)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → inline message      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The line item is not in the cart.
    #[error("Book {0} is not in the cart")]
    NotInCart(String),

    /// One more unit would overflow the line's quantity.
    #[error("Quantity of book {0} cannot grow any further")]
    QuantityOverflow(String),

    /// A price could not be represented in cents.
    ///
    /// ## When This Occurs
    /// - The backend sent a price with more than two decimal places that
    ///   does not round cleanly
    /// - The value overflows `i64` cents (e.g. `1e28`)
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These stand in for the `required` form constraints: a form that fails
/// validation is never submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. email without `@`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityOverflow("abc".into());
        assert_eq!(err.to_string(), "Quantity of book abc cannot grow any further");

        let err = CoreError::NotInCart("abc".into());
        assert_eq!(err.to_string(), "Book abc is not in the cart");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
