//! # REST Client
//!
//! One `reqwest::Client` for the bookstore backend. Endpoint methods live in
//! [`crate::api`]; this module owns URL building, the auth header and the
//! response policy shared by all of them.
//!
//! ## Response Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  status            authenticated call              public call          │
//! │  ──────            ──────────────────              ───────────          │
//! │  2xx               decode body (schema)            decode body          │
//! │  401               SessionGuard → Unauthorized     Server{401, msg}     │
//! │  other             Server{status, msg}             Server{status, msg}  │
//! │  no response       Network / Timeout               Network / Timeout    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Public calls are login and registration: a 401 there means "wrong
//! password", not "session expired".

use std::fmt;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use url::Url;

use pageturner_store::CredentialStore;

use crate::api::schema::error_message;
use crate::config::{AuthScheme, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::navigator::SessionGuard;

/// Header used by [`AuthScheme::XAuthToken`].
pub const X_AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Whether a request carries the stored credential and is subject to the
/// 401 guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Authenticated,
    Public,
}

/// Client for the bookstore REST backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth_scheme: AuthScheme,
    credentials: CredentialStore,
    guard: SessionGuard,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth_scheme", &self.auth_scheme)
            .field("logged_in", &self.credentials.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error if the base URL is unusable or the HTTP client
    /// fails to build.
    pub fn new(
        config: &ClientConfig,
        credentials: CredentialStore,
        guard: SessionGuard,
    ) -> ClientResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.api.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {e}")))?;

        debug!(base_url = %base_url, scheme = %config.api.auth_scheme, "API client ready");

        Ok(ApiClient {
            http,
            base_url,
            auth_scheme: config.api.auth_scheme,
            credentials,
            guard,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn session_guard(&self) -> &SessionGuard {
        &self.guard
    }

    // =========================================================================
    // Request Building
    // =========================================================================

    /// `base_url` with `segments` appended, each percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
        access: Access,
    ) -> ClientResult<RequestBuilder> {
        let builder = self.http.request(method, self.endpoint(segments)?);
        if access == Access::Public {
            return Ok(builder);
        }

        Ok(match self.credentials.load() {
            Some(credential) => self.authorize(builder, &credential.token),
            None => builder,
        })
    }

    fn authorize(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        match self.auth_scheme {
            AuthScheme::Bearer => builder.bearer_auth(token),
            AuthScheme::XAuthToken => builder.header(X_AUTH_TOKEN_HEADER, token),
        }
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let req = self.request(Method::GET, segments, Access::Authenticated)?;
        self.fetch(req, Access::Authenticated).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let req = self
            .request(Method::GET, segments, Access::Authenticated)?
            .query(query);
        self.fetch(req, Access::Authenticated).await
    }

    pub(crate) async fn post<T, B>(&self, segments: &[&str], body: &B, access: Access) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, segments, access)?.json(body);
        self.fetch(req, access).await
    }

    pub(crate) async fn put<T, B>(&self, segments: &[&str], body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self
            .request(Method::PUT, segments, Access::Authenticated)?
            .json(body);
        self.fetch(req, Access::Authenticated).await
    }

    /// Sends a bodiless request and ignores the response body.
    pub(crate) async fn send_ignoring_body(&self, method: Method, segments: &[&str]) -> ClientResult<()> {
        let req = self.request(method, segments, Access::Authenticated)?;
        self.execute(req, Access::Authenticated).await.map(|_| ())
    }

    /// `PUT` with a JSON body, ignoring the response body.
    pub(crate) async fn put_ignoring_body<B>(&self, segments: &[&str], body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let req = self
            .request(Method::PUT, segments, Access::Authenticated)?
            .json(body);
        self.execute(req, Access::Authenticated).await.map(|_| ())
    }

    // =========================================================================
    // Response Handling
    // =========================================================================

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, access: Access) -> ClientResult<T> {
        let body = self.execute(req, access).await?;
        serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, "Response did not match the expected schema");
            ClientError::Decode(e.to_string())
        })
    }

    /// Sends `req` and applies the response policy. Returns the raw body of
    /// a 2xx response.
    async fn execute(&self, req: RequestBuilder, access: Access) -> ClientResult<Vec<u8>> {
        let response = req.send().await.map_err(|e| {
            error!(error = %e, "Request did not reach the backend");
            ClientError::from(e)
        })?;

        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.bytes().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), path = %path, bytes = body.len(), "Request succeeded");
            return Ok(body.to_vec());
        }

        if status == StatusCode::UNAUTHORIZED && access == Access::Authenticated {
            warn!(path = %path, "Backend returned 401");
            self.guard.handle_unauthorized();
            return Err(ClientError::Unauthorized);
        }

        let message = error_message(&body);
        error!(status = status.as_u16(), path = %path, ?message, "Request failed");
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pageturner_store::Store;

    use super::*;
    use crate::navigator::NoOpNavigator;

    fn client(base_url: &str) -> ApiClient {
        let tab = Store::in_memory().open_context();
        let guard = SessionGuard::new(
            tab.credentials().clone(),
            tab.cart().clone(),
            Arc::new(NoOpNavigator),
        );
        ApiClient::new(
            &ClientConfig::with_base_url(base_url),
            tab.credentials().clone(),
            guard,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let api = client("http://localhost:3000/api");
        assert_eq!(
            api.endpoint(&["books", "42"]).unwrap().as_str(),
            "http://localhost:3000/api/books/42"
        );

        let api = client("http://localhost:3000/api/");
        assert_eq!(
            api.endpoint(&["cart", "count"]).unwrap().as_str(),
            "http://localhost:3000/api/cart/count"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://localhost:3000/api");
        let url = api.endpoint(&["books", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/api/books/a%2Fb%20c");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let tab = Store::in_memory().open_context();
        let guard = SessionGuard::new(
            tab.credentials().clone(),
            tab.cart().clone(),
            Arc::new(NoOpNavigator),
        );
        let result = ApiClient::new(
            &ClientConfig::with_base_url("mailto:someone"),
            tab.credentials().clone(),
            guard,
        );
        assert!(result.unwrap_err().is_config_error());
    }
}
