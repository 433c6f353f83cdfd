//! # Store Error Types
//!
//! Error types for raw key-value backend operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / full quota / bad key                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the key and categorization            │
//! │       │                                                                 │
//! │       ├──► CartStore: logged at warn, swallowed (cart fails soft)      │
//! │       │                                                                 │
//! │       └──► CredentialStore: returned to the caller                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Key-value backend errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    ///
    /// ## When This Occurs
    /// - Data directory not writable
    /// - Disk full
    #[error("I/O error on key '{key}': {message}")]
    Io { key: String, message: String },

    /// The backend refused the write because it is full.
    #[error("Quota exceeded writing '{key}' ({size} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    /// The key contains characters the backend cannot store.
    #[error("Invalid key: '{0}'")]
    InvalidKey(String),

    /// Internal state is unusable (poisoned lock).
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates an Io error for a key.
    pub fn io(key: impl Into<String>, err: std::io::Error) -> Self {
        StoreError::Io {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if the failure is about capacity rather than a fault.
    pub fn is_quota(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
