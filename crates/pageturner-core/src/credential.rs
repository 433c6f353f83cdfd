//! # Credential
//!
//! The opaque session token plus the admin flag that travels with it.
//!
//! The token is never inspected here. It is issued by the backend on
//! login/registration and forgotten on logout or on the first 401.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stored session credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Opaque bearer token.
    pub token: String,

    /// Whether the holder may use admin routes.
    pub is_admin: bool,
}

impl Credential {
    /// Creates a credential.
    pub fn new(token: impl Into<String>, is_admin: bool) -> Self {
        Credential {
            token: token.into(),
            is_admin,
        }
    }

    /// Creates a non-admin credential.
    pub fn user(token: impl Into<String>) -> Self {
        Credential::new(token, false)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}
