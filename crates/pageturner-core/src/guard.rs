//! # Route Guard
//!
//! Decides whether a view may render for the current credential.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Guard Decisions                                 │
//! │                                                                         │
//! │  required        credential         decision                           │
//! │  ────────        ──────────         ────────                           │
//! │  None            any                Allow                              │
//! │  Authenticated   None               Redirect("/login")                 │
//! │  Authenticated   Some(_)            Allow                              │
//! │  Admin           None               Redirect("/login")                 │
//! │  Admin           Some(!is_admin)    Redirect("/")                      │
//! │  Admin           Some(is_admin)     Allow                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Purely local: the token is not checked for expiry and the server is not
//! asked. A stale token is caught later by the 401 handling in the sync
//! crate.

use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::{HOME_ROUTE, LOGIN_ROUTE};

/// What a route demands of the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredRole {
    /// Any signed-in user.
    Authenticated,
    /// Signed-in user with the admin flag.
    Admin,
}

/// Outcome of [`guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

impl GuardDecision {
    /// Returns true if the view may render.
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Evaluates the guard for a route.
pub fn guard(credential: Option<&Credential>, required: Option<RequiredRole>) -> GuardDecision {
    let Some(required) = required else {
        return GuardDecision::Allow;
    };

    match (credential, required) {
        (None, _) => GuardDecision::Redirect(LOGIN_ROUTE),
        (Some(cred), RequiredRole::Admin) if !cred.is_admin => GuardDecision::Redirect(HOME_ROUTE),
        (Some(_), _) => GuardDecision::Allow,
    }
}
