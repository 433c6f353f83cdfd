//! # Client Error Types
//!
//! Every failure a UI action can end in.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Transport      │  │   Server        │  │     Session             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  Server{status} │  │  Unauthorized (401)     │ │
//! │  │  Timeout        │  │  Decode         │  │  InvalidCredentials     │ │
//! │  │                 │  │  MissingToken   │  │  Busy                   │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │  Local          │  │  Configuration  │                              │
//! │  │                 │  │                 │                              │
//! │  │  Validation     │  │  InvalidConfig  │                              │
//! │  │  Cart           │  │  InvalidUrl     │                              │
//! │  │  Storage        │  │  ConfigLoad/Save│                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! │                                                                         │
//! │  Nothing here is retried. Each error ends its request and is shown     │
//! │  once via user_message().                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pageturner_core::{CoreError, ValidationError};
use pageturner_store::StoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering all possible request failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// Non-success status other than 401.
    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    /// A 2xx body did not match the expected schema.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Registration succeeded without handing back a token.
    #[error("No token received from server")]
    MissingToken,

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// 401 on an authenticated call. The session has already been cleared.
    #[error("Session expired or not authorized")]
    Unauthorized,

    /// Login rejected.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// A submission is already in flight.
    #[error("A request is already in progress")]
    Busy,

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Form input rejected before sending.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Cart rule violated.
    #[error(transparent)]
    Cart(CoreError),

    /// Credential could not be persisted.
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ClientError::Validation(v),
            other => ClientError::Cart(other),
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the session was (or must be) dropped.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::InvalidCredentials)
    }

    /// Returns true if the backend could not be reached.
    pub fn is_network_error(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// One line suitable for a dismissible inline message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Could not reach the server. Please check your connection.".to_string()
            }
            ClientError::Timeout => "The server took too long to respond. Please try again.".to_string(),
            ClientError::Server {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            ClientError::Server { status, .. } if *status == 404 => {
                "The requested item was not found.".to_string()
            }
            ClientError::Server { .. } => "Something went wrong. Please try again.".to_string(),
            ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
            ClientError::MissingToken => "No token received from server".to_string(),
            ClientError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ClientError::InvalidCredentials => "Invalid Credentials".to_string(),
            ClientError::Busy => "Please wait for the current request to finish.".to_string(),
            ClientError::Validation(e) => e.to_string(),
            ClientError::Cart(e) => e.to_string(),
            ClientError::Storage(_) => "Could not save your session locally.".to_string(),
            other => other.to_string(),
        }
    }
}
