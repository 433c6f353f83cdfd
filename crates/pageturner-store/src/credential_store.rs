//! # Credential Store
//!
//! Persists the session credential as two keys, `token` and `isAdmin`.
//! Both are written together and cleared together.

use std::sync::Arc;

use pageturner_core::{Credential, ADMIN_FLAG_STORAGE_KEY, TOKEN_STORAGE_KEY};
use tracing::{debug, info, warn};

use crate::backend::KeyValueBackend;
use crate::error::StoreResult;
use crate::notifier::{ChangeNotifier, ContextId};

/// Credential persistence bound to one context.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueBackend>,
    notifier: ChangeNotifier,
    context: ContextId,
}

impl CredentialStore {
    /// Creates a credential store writing on behalf of `context`.
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        notifier: ChangeNotifier,
        context: ContextId,
    ) -> Self {
        CredentialStore {
            backend,
            notifier,
            context,
        }
    }

    /// Reads the stored credential.
    ///
    /// A token with a missing or unreadable flag is a non-admin credential.
    /// An empty token counts as no credential.
    pub fn load(&self) -> Option<Credential> {
        let token = match self.backend.get(TOKEN_STORAGE_KEY) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read credential");
                return None;
            }
        };

        let is_admin = matches!(
            self.backend.get(ADMIN_FLAG_STORAGE_KEY),
            Ok(Some(flag)) if flag == "true"
        );

        Some(Credential::new(token, is_admin))
    }

    /// Stores a credential, replacing any previous one.
    ///
    /// If the flag cannot be written the token is rolled back so a
    /// half-written credential never survives.
    pub fn save(&self, credential: &Credential) -> StoreResult<()> {
        self.backend.set(TOKEN_STORAGE_KEY, &credential.token)?;

        let flag = if credential.is_admin { "true" } else { "false" };
        if let Err(e) = self.backend.set(ADMIN_FLAG_STORAGE_KEY, flag) {
            let _ = self.backend.remove(TOKEN_STORAGE_KEY);
            return Err(e);
        }

        info!(is_admin = credential.is_admin, "Credential stored");
        self.notifier.publish(TOKEN_STORAGE_KEY, self.context);
        Ok(())
    }

    /// Forgets the credential. Both keys are removed even if one fails.
    pub fn clear(&self) -> StoreResult<()> {
        let token = self.backend.remove(TOKEN_STORAGE_KEY);
        let flag = self.backend.remove(ADMIN_FLAG_STORAGE_KEY);

        debug!(context = %self.context, "Credential cleared");
        self.notifier.publish(TOKEN_STORAGE_KEY, self.context);
        token.and(flag)
    }

    /// Returns true if a token is stored.
    pub fn is_logged_in(&self) -> bool {
        self.load().is_some()
    }
}
