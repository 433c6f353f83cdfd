//! # CLI Errors
//!
//! Everything a command can fail with, and the exit code each maps to.
//!
//! ```text
//! ┌──────────────────────────────┬──────┬──────────────────────────────────┐
//! │ CliError                     │ exit │ printed as                       │
//! ├──────────────────────────────┼──────┼──────────────────────────────────┤
//! │ Redirect(route)              │  2   │ "redirect: /login"               │
//! │ Client(Unauthorized, ...)    │  3   │ user message                     │
//! │ Client(Validation, ...)      │  4   │ user message                     │
//! │ anything else                │  1   │ user message / error chain       │
//! └──────────────────────────────┴──────┴──────────────────────────────────┘
//! ```

use std::process::ExitCode;

use thiserror::Error;

use pageturner_core::CoreError;
use pageturner_store::StoreError;
use pageturner_sync::ClientError;

#[derive(Debug, Error)]
pub enum CliError {
    /// The route guard refused; the UI would have navigated here.
    #[error("redirect: {0}")]
    Redirect(&'static str),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cart(#[from] CoreError),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            CliError::Redirect(_) => 2,
            CliError::Client(e) if e.is_auth_error() => 3,
            CliError::Client(ClientError::Validation(_)) | CliError::Cart(_) => 4,
            _ => 1,
        }
    }

    /// The line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            CliError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pageturner_core::ValidationError;

    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Redirect("/login").code(), 2);
        assert_eq!(CliError::Client(ClientError::Unauthorized).code(), 3);
        assert_eq!(CliError::Client(ClientError::InvalidCredentials).code(), 3);
        assert_eq!(
            CliError::Client(ClientError::Validation(ValidationError::Required {
                field: "email".into()
            })).code(),
            4
        );
        assert_eq!(CliError::Cart(CoreError::NotInCart("b1".into())).code(), 4);
        assert_eq!(CliError::Client(ClientError::Timeout).code(), 1);
    }

    #[test]
    fn test_redirect_message() {
        assert_eq!(CliError::Redirect("/").user_message(), "redirect: /");
    }
}
