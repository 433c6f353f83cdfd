//! # Validation Module
//!
//! Form checks that run before anything is sent to the backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form input (CLI args / web form)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (required fields, ranges)                        │
//! │           │   failure → ValidationError, request never sent            │
//! │           ▼                                                             │
//! │  Layer 3: REST backend (authoritative, answers 4xx with a `msg`)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pageturner_core::validation::validate_login;
//!
//! assert!(validate_login("ann@example.com", "hunter2").is_ok());
//! assert!(validate_login("", "hunter2").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::BookDraft;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Account Forms
// =============================================================================

/// Validates an email address.
///
/// Only the shape is checked (`local@domain`); the backend decides whether
/// the account exists.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("email", email)?;
    max_len("email", email, 254)?;

    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

/// Validates a password. Only presence is enforced client-side.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates the login form.
pub fn validate_login(email: &str, password: &str) -> ValidationResult<()> {
    validate_email(email)?;
    validate_password(password)
}

/// Validates the registration form.
pub fn validate_registration(name: &str, email: &str, password: &str) -> ValidationResult<()> {
    required("name", name)?;
    max_len("name", name, 100)?;
    validate_login(email, password)
}

// =============================================================================
// Admin Book Form
// =============================================================================

/// Validates a book create/update form.
///
/// ## Rules
/// - title, author and isbn are required
/// - price must not be negative (zero is a free book)
/// - stock must not be negative
pub fn validate_book_draft(draft: &BookDraft) -> ValidationResult<()> {
    required("title", &draft.title)?;
    max_len("title", &draft.title, 300)?;
    required("author", &draft.author)?;
    max_len("author", &draft.author, 200)?;
    required("isbn", &draft.isbn)?;

    if draft.price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if draft.stock_quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stockQuantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Search
// =============================================================================

/// Validates a catalog search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    required("query", query)?;
    max_len("query", query, 200)?;
    Ok(query.trim().to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn draft() -> BookDraft {
        BookDraft {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            isbn: "9780441013593".into(),
            price: Money::from_cents(999),
            stock_quantity: 3,
            description: None,
            cover_image: None,
        }
    }

    #[test]
    fn test_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert_eq!(
            validate_email("   "),
            Err(ValidationError::Required {
                field: "email".into()
            })
        );
        assert!(matches!(
            validate_email("no-at-sign"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_email("@b.co").is_err());
    }

    #[test]
    fn test_registration_requires_name() {
        assert!(validate_registration("Ann", "a@b.co", "pw").is_ok());
        assert_eq!(
            validate_registration("", "a@b.co", "pw"),
            Err(ValidationError::Required {
                field: "name".into()
            })
        );
        assert!(validate_registration("Ann", "a@b.co", "").is_err());
    }

    #[test]
    fn test_book_draft_rules() {
        assert!(validate_book_draft(&draft()).is_ok());

        let mut free = draft();
        free.price = Money::zero();
        assert!(validate_book_draft(&free).is_ok());

        let mut no_isbn = draft();
        no_isbn.isbn = String::new();
        assert!(matches!(
            validate_book_draft(&no_isbn),
            Err(ValidationError::Required { field }) if field == "isbn"
        ));

        let mut negative = draft();
        negative.price = Money::from_cents(-1);
        assert!(validate_book_draft(&negative).is_err());

        let mut no_stock = draft();
        no_stock.stock_quantity = -2;
        assert!(validate_book_draft(&no_stock).is_err());
    }

    #[test]
    fn test_search_query_trimmed() {
        assert_eq!(validate_search_query("  tolkien ").unwrap(), "tolkien");
        assert!(validate_search_query("").is_err());
    }
}
