//! # Session
//!
//! Everything one context needs to act for a user: its store handle, the
//! REST client wired to that handle's credential, and the busy flag that
//! keeps forms from double-submitting.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login(email, password)                                                 │
//! │    1. validate form               ── fail → Validation (nothing sent)   │
//! │    2. POST /auth/login            ── 400/401 → InvalidCredentials       │
//! │    3. store { token, isAdmin: false }                                   │
//! │    4. resolve role                                                      │
//! │         StoredFlag: GET /auth/me  → isAdmin                             │
//! │         TokenClaim: read JWT payload                                    │
//! │         fail → credential cleared, error returned                       │
//! │    5. store { token, isAdmin }                                          │
//! │    6. navigate: admin → /admin, otherwise → /profile                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{info, instrument, warn};

use pageturner_core::{
    guard, Credential, GuardDecision, RequiredRole, ADMIN_ROUTE, HOME_ROUTE, PROFILE_ROUTE,
};
use pageturner_store::StoreHandle;

use crate::busy::BusyFlag;
use crate::cart_sync::CartSync;
use crate::claims::admin_claim;
use crate::client::ApiClient;
use crate::config::{ClientConfig, RoleSource};
use crate::error::ClientResult;
use crate::navigator::{Navigator, SessionGuard};
use crate::projector::CartProjector;

/// What the home page shows for the current visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HomeView {
    pub logged_in: bool,
    pub is_admin: bool,
}

/// One context acting on behalf of one user.
pub struct Session {
    store: StoreHandle,
    client: ApiClient,
    config: ClientConfig,
    navigator: Arc<dyn Navigator>,
    busy: BusyFlag,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.store.context())
            .field("client", &self.client)
            .field("busy", &self.busy.is_busy())
            .finish()
    }
}

impl Session {
    /// Wires a client to `store`'s credential and cart.
    pub fn new(
        config: ClientConfig,
        store: StoreHandle,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let guard = SessionGuard::new(
            store.credentials().clone(),
            store.cart().clone(),
            Arc::clone(&navigator),
        );
        let client = ApiClient::new(&config, store.credentials().clone(), guard)?;

        Ok(Session {
            store,
            client,
            config,
            navigator,
            busy: BusyFlag::new(),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn busy(&self) -> &BusyFlag {
        &self.busy
    }

    // =========================================================================
    // Credential State
    // =========================================================================

    /// The stored credential, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.store.credentials().load()
    }

    pub fn is_logged_in(&self) -> bool {
        self.credential().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.credential().is_some_and(|c| c.is_admin)
    }

    /// Route guard for a view requiring `required`.
    pub fn guard(&self, required: Option<RequiredRole>) -> GuardDecision {
        guard(self.credential().as_ref(), required)
    }

    pub fn home_view(&self) -> HomeView {
        let credential = self.credential();
        HomeView {
            logged_in: credential.is_some(),
            is_admin: credential.is_some_and(|c| c.is_admin),
        }
    }

    /// Mounts a cart projector on this session's store handle.
    pub fn projector(&self) -> CartProjector {
        CartProjector::mount(&self.store)
    }

    /// Couples `projector` to the server-side cart.
    pub fn cart_sync<'a>(&'a self, projector: &'a CartProjector) -> CartSync<'a> {
        CartSync::new(&self.client, projector)
    }

    // =========================================================================
    // Account Flows
    // =========================================================================

    /// Logs in and navigates to the landing route. Returns that route.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<&'static str> {
        self.busy
            .guarded(async {
                let token = self.client.login_request(email, password).await?;
                self.store.credentials().save(&Credential::user(token.as_str()))?;

                let is_admin = match self.resolve_role(&token).await {
                    Ok(is_admin) => is_admin,
                    Err(e) => {
                        warn!(error = %e, "Role lookup failed, dropping credential");
                        self.forget_credential();
                        return Err(e);
                    }
                };
                self.store.credentials().save(&Credential::new(token, is_admin))?;

                let landing = if is_admin { ADMIN_ROUTE } else { PROFILE_ROUTE };
                info!(is_admin, landing, "Logged in");
                self.navigator.redirect(landing);
                Ok(landing)
            })
            .await
    }

    /// Registers, stores the issued token and navigates home.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<&'static str> {
        self.busy
            .guarded(async {
                let token = self.client.register_request(name, email, password).await?;
                self.store.credentials().save(&Credential::user(token))?;

                info!("Registered");
                self.navigator.redirect(HOME_ROUTE);
                Ok(HOME_ROUTE)
            })
            .await
    }

    /// Tells the backend (best effort), then drops the credential and the
    /// cart.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.is_logged_in() {
            if let Err(e) = self.client.logout_request().await {
                warn!(error = %e, "Logout request failed, clearing locally anyway");
            }
        }

        self.forget_credential();
        if !self.store.cart().clear() {
            warn!("Failed to clear cart on logout");
        }

        info!("Logged out");
        self.navigator.redirect(HOME_ROUTE);
    }

    async fn resolve_role(&self, token: &str) -> ClientResult<bool> {
        match self.config.api.role_source {
            RoleSource::StoredFlag => Ok(self.client.me().await?.is_admin),
            RoleSource::TokenClaim => Ok(admin_claim(token)),
        }
    }

    fn forget_credential(&self) {
        if let Err(e) = self.store.credentials().clear() {
            warn!(error = %e, "Failed to clear credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use pageturner_core::{LineItem, Money};
    use pageturner_store::Store;

    use super::*;
    use crate::config::AuthScheme;
    use crate::error::ClientError;
    use crate::test_support::{session_with, FakeBackend, ADMIN_TOKEN, USER_TOKEN};

    #[tokio::test]
    async fn test_user_login_lands_on_profile() {
        let fake = FakeBackend::start().await;
        let (session, nav) = fake.session();

        let landing = session.login("ann@example.com", "secret").await.unwrap();
        assert_eq!(landing, "/profile");
        assert_eq!(nav.last().as_deref(), Some("/profile"));
        assert_eq!(session.credential(), Some(Credential::new(USER_TOKEN, false)));
        assert_eq!(
            session.home_view(),
            HomeView {
                logged_in: true,
                is_admin: false
            }
        );
    }

    #[tokio::test]
    async fn test_admin_login_fetches_flag_and_lands_on_admin() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();

        let landing = session.login("admin@example.com", "secret").await.unwrap();
        assert_eq!(landing, "/admin");
        assert!(session.is_admin());
        assert!(session.guard(Some(RequiredRole::Admin)).is_allowed());

        let me = fake.seen().into_iter().find(|s| s.path == "/auth/me").unwrap();
        assert_eq!(me.token.as_deref(), Some(ADMIN_TOKEN));
        assert!(!me.x_auth);
    }

    #[tokio::test]
    async fn test_login_request_carries_no_credential() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();
        session
            .store()
            .credentials()
            .save(&Credential::user("old-token"))
            .unwrap();

        session.login("ann@example.com", "secret").await.unwrap();
        let login = fake.seen().into_iter().find(|s| s.path == "/auth/login").unwrap();
        assert_eq!(login.token, None);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let fake = FakeBackend::start().await;
        let (session, nav) = fake.session();

        let err = session.login("ann@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
        assert_eq!(err.user_message(), "Invalid Credentials");
        assert!(!session.is_logged_in());
        assert!(nav.routes().is_empty());
    }

    #[tokio::test]
    async fn test_token_claim_role_source_skips_profile_call() {
        let fake = FakeBackend::start().await;
        let mut config = fake.config();
        config.api.role_source = RoleSource::TokenClaim;
        let (session, _nav) = session_with(config, Store::in_memory().open_context());

        // The fake issues opaque tokens, so no admin claim is found
        let landing = session.login("admin@example.com", "secret").await.unwrap();
        assert_eq!(landing, "/profile");
        assert!(!session.is_admin());
        assert!(fake.seen().iter().all(|s| s.path != "/auth/me"));
    }

    #[tokio::test]
    async fn test_rejected_token_during_role_lookup_logs_out() {
        let fake = FakeBackend::start().await;
        let (session, nav) = fake.session();

        let err = session.login("stale@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert!(session.credential().is_none());
        assert_eq!(nav.last().as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();

        let err = session.login("", "secret").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        let err = session.register("Ann", "ann@example.com", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_register_lands_home() {
        let fake = FakeBackend::start().await;
        let (session, nav) = fake.session();

        let landing = session
            .register("Ann", "new@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(landing, "/");
        assert_eq!(nav.last().as_deref(), Some("/"));
        assert_eq!(session.credential(), Some(Credential::user(USER_TOKEN)));
    }

    #[tokio::test]
    async fn test_register_without_token_is_an_error() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();

        let err = session
            .register("Ann", "notoken@example.com", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
        assert_eq!(err.to_string(), "No token received from server");
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_register_shows_server_message() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();

        let err = session
            .register("Ann", "taken@example.com", "secret")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), "User already exists");
    }

    #[tokio::test]
    async fn test_unauthorized_clears_credential_and_cart() {
        let fake = FakeBackend::start().await;
        let (session, nav) = fake.session();
        let projector = session.projector();

        session
            .store()
            .credentials()
            .save(&Credential::new("expired-token", true))
            .unwrap();
        projector.upsert(LineItem::new("b1", "Dune", "Herbert", Money::from_cents(999), 2));
        assert!(!projector.is_empty());

        let err = session.client().orders().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert!(session.credential().is_none());
        assert!(session.store().cart().load().is_empty());
        assert!(projector.is_empty());
        assert_eq!(nav.routes(), vec!["/login".to_string()]);
        assert_eq!(session.guard(Some(RequiredRole::Authenticated)), GuardDecision::Redirect("/login"));
    }

    #[tokio::test]
    async fn test_unauthorized_reaches_other_contexts() {
        let fake = FakeBackend::start().await;
        let store = Store::in_memory();
        let (session_a, _nav) = session_with(fake.config(), store.open_context());
        let tab_b = store.open_context();
        let projector_b = CartProjector::mount(&tab_b);

        session_a
            .store()
            .credentials()
            .save(&Credential::user("expired-token"))
            .unwrap();
        projector_b.upsert(LineItem::new("b1", "Dune", "", Money::from_cents(500), 1));

        let _ = session_a.client().cart_count().await;
        assert!(projector_b.is_empty());
        assert!(tab_b.credentials().load().is_none());
    }

    #[tokio::test]
    async fn test_x_auth_token_scheme() {
        let fake = FakeBackend::start().await;
        let mut config = fake.config();
        config.api.auth_scheme = AuthScheme::XAuthToken;
        let (session, _nav) = session_with(config, Store::in_memory().open_context());

        session.login("ann@example.com", "secret").await.unwrap();
        let me = fake.seen().into_iter().find(|s| s.path == "/auth/me").unwrap();
        assert!(me.x_auth);
        assert_eq!(me.token.as_deref(), Some(USER_TOKEN));
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let fake = FakeBackend::start().await;
        let (session, nav) = fake.session();
        session.login("ann@example.com", "secret").await.unwrap();
        let projector = session.projector();
        projector.upsert(LineItem::new("b1", "Dune", "", Money::from_cents(500), 1));

        session.logout().await;
        assert!(!session.is_logged_in());
        assert!(projector.is_empty());
        assert_eq!(nav.last().as_deref(), Some("/"));
        assert!(fake.seen().iter().any(|s| s.path == "/auth/logout"));
    }

    #[tokio::test]
    async fn test_logged_out_logout_sends_nothing() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();
        session.logout().await;
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_rejected() {
        let fake = FakeBackend::start().await;
        let (session, _nav) = fake.session();

        let _held = session.busy().try_begin().unwrap();
        let err = session.login("ann@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, ClientError::Busy));
        assert_eq!(fake.request_count(), 0);
    }
}
