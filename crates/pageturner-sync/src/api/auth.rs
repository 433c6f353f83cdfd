//! Account endpoints.
//!
//! Login and registration are public calls: they carry no credential and a
//! 401 from them does not trigger the forced logout.

use reqwest::Method;
use tracing::{debug, instrument, warn};

use pageturner_core::validation::{validate_login, validate_registration};
use pageturner_core::UserProfile;

use crate::api::schema::{LoginRequest, RegisterRequest, TokenResponse};
use crate::client::{Access, ApiClient};
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    /// `POST /auth/login`. Returns the issued token.
    ///
    /// A 400 or 401 is reported as [`ClientError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn login_request(&self, email: &str, password: &str) -> ClientResult<String> {
        validate_login(email, password)?;

        let body = LoginRequest {
            email: email.trim(),
            password,
        };
        let response: TokenResponse = self
            .post(&["auth", "login"], &body, Access::Public)
            .await
            .map_err(|e| match e.status() {
                Some(400) | Some(401) => ClientError::InvalidCredentials,
                _ => e,
            })?;

        response.into_token().ok_or_else(|| {
            warn!("Login succeeded without a token");
            ClientError::MissingToken
        })
    }

    /// `POST /auth/register`. Returns the issued token.
    #[instrument(skip(self, password))]
    pub async fn register_request(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<String> {
        validate_registration(name, email, password)?;

        let body = RegisterRequest {
            name: name.trim(),
            email: email.trim(),
            password,
        };
        let response: TokenResponse = self
            .post(&["auth", "register"], &body, Access::Public)
            .await?;

        response.into_token().ok_or_else(|| {
            warn!("Registration succeeded without a token");
            ClientError::MissingToken
        })
    }

    /// `GET /auth/me`
    #[instrument(skip(self))]
    pub async fn me(&self) -> ClientResult<UserProfile> {
        let profile: UserProfile = self.get(&["auth", "me"]).await?;
        debug!(is_admin = profile.is_admin, "Fetched profile");
        Ok(profile)
    }

    /// `POST /auth/logout`. The response body is ignored.
    #[instrument(skip(self))]
    pub async fn logout_request(&self) -> ClientResult<()> {
        self.send_ignoring_body(Method::POST, &["auth", "logout"])
            .await
    }
}
