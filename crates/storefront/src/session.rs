//! Authentication session.
//!
//! Login is mocked: any non-empty email/password pair succeeds and yields a
//! demo user. The session persists the token and user under the
//! [`keys::TOKEN`] and [`keys::USER`] storage keys so it survives restarts.
//! Whatever is stored, a missing or corrupt value means "logged out".

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use gems_core::UserId;

use crate::clock::Clock;
use crate::storage::{LocalStore, StorageError, keys};

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("username, email and password are required")]
    MissingRegistrationFields,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The logged-in user as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login state for one storefront session.
pub struct AuthSession {
    store: Arc<dyn LocalStore>,
    clock: Arc<dyn Clock>,
    user: Option<CurrentUser>,
    token: Option<SecretString>,
}

impl AuthSession {
    /// Restore the session from local storage.
    ///
    /// A token without a stored user is discarded; an unparseable user
    /// discards both.
    pub fn restore(store: Arc<dyn LocalStore>, clock: Arc<dyn Clock>) -> Self {
        let mut session = Self {
            store,
            clock,
            user: None,
            token: None,
        };

        let Some(token) = session.store.get(keys::TOKEN) else {
            return session;
        };

        match session.store.get(keys::USER) {
            Some(raw) => match serde_json::from_str::<CurrentUser>(&raw) {
                Ok(user) => {
                    session.user = Some(user);
                    session.token = Some(SecretString::from(token));
                }
                Err(e) => {
                    warn!("Discarding corrupt stored user: {e}");
                    session.forget(&[keys::TOKEN, keys::USER]);
                }
            },
            None => session.forget(&[keys::TOKEN]),
        }

        session
    }

    /// Log in with any non-empty credentials.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if either field is empty, or a storage
    /// error if the session could not be persisted.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&CurrentUser, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = CurrentUser {
            id: UserId::new(1),
            email: email.to_owned(),
            username: email.split('@').next().unwrap_or(email).to_owned(),
            role: "Buyer".to_owned(),
            first_name: "Demo".to_owned(),
            last_name: "User".to_owned(),
        };
        let token = format!("demo-token-{}", self.clock.now().timestamp_millis());

        self.store.set(keys::TOKEN, &token)?;
        self.store.set(keys::USER, &serde_json::to_string(&user).map_err(StorageError::from)?)?;

        info!(user_id = %user.id, "User logged in");
        self.token = Some(SecretString::from(token));
        Ok(self.user.insert(user))
    }

    /// Accept a registration when every field is present.
    ///
    /// Registration does not log the user in.
    ///
    /// # Errors
    ///
    /// Returns `MissingRegistrationFields` if any field is empty.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&'static str, AuthError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingRegistrationFields);
        }
        Ok("Registration successful! You can now log in.")
    }

    /// Log out and forget the stored credentials.
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.forget(&[keys::TOKEN, keys::USER]);
        info!("User logged out");
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Bearer token for the remote cart service.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.expose_secret())
    }

    /// Whether the user holds any of the given roles.
    #[must_use]
    pub fn has_role(&self, roles: &[&str]) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| roles.contains(&user.role.as_str()))
    }

    fn forget(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.store.remove(key) {
                warn!(key, "Failed to clear stored session value: {e}");
            }
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
