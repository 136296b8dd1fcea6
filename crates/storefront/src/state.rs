//! Application state shared by every storefront command.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use tracing::info;

use crate::cart::CartEngine;
use crate::catalog::DemoCatalog;
use crate::checkout::{CheckoutError, CheckoutMachine, PaymentProcessor, SimulatedPayment};
use crate::clock::{Clock, SystemClock};
use crate::config::StorefrontConfig;
use crate::error::{CartError, clear_sentry_user, set_sentry_user};
use crate::remote::{CartService, HttpCartClient, UnconfiguredCartService};
use crate::session::{AuthError, AuthSession, CurrentUser};
use crate::storage::{FileStore, LocalStore};

/// Shared storefront state: configuration, the auth session and the cart
/// engine it drives.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<DemoCatalog>,
    engine: Arc<CartEngine>,
    session: RwLock<AuthSession>,
    http: Option<HttpCartClient>,
    payment: Arc<dyn PaymentProcessor>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create the state described by `config`.
    ///
    /// Values are stored under `config.data_dir`; authenticated carts go to
    /// `config.cart_api_url` when set.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(&config.data_dir));
        let http = config.cart_api_url.clone().map(HttpCartClient::new);
        let remote: Arc<dyn CartService> = match &http {
            Some(client) => Arc::new(client.clone()),
            None => Arc::new(UnconfiguredCartService),
        };
        let payment = Arc::new(SimulatedPayment::new(config.payment_delay));
        Self::assemble(config, store, remote, http, payment, Arc::new(SystemClock))
    }

    /// Create state over caller-supplied collaborators.
    #[must_use]
    pub fn with_services(
        config: StorefrontConfig,
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn CartService>,
        payment: Arc<dyn PaymentProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::assemble(config, store, remote, None, payment, clock)
    }

    fn assemble(
        config: StorefrontConfig,
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn CartService>,
        http: Option<HttpCartClient>,
        payment: Arc<dyn PaymentProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let catalog = Arc::new(DemoCatalog::new());
        let engine = Arc::new(CartEngine::new(store.clone(), remote, catalog.clone()));
        let session = AuthSession::restore(store, clock.clone());
        if let Some(client) = &http {
            client.set_token(session.token().map(SecretString::from));
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                engine,
                session: RwLock::new(session),
                http,
                payment,
                clock,
            }),
        }
    }

    /// Bring the cart in line with the restored session.
    ///
    /// # Errors
    ///
    /// Returns the cart error when an authenticated cart cannot be fetched.
    pub async fn init(&self) -> Result<(), CartError> {
        if self.is_authenticated() {
            self.inner.engine.set_authenticated(true).await
        } else {
            self.inner.engine.load().await
        }
    }

    /// Log in and switch the cart to the authenticated store.
    ///
    /// A failed cart reload is reported but does not fail the login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when the credentials are missing or the session
    /// cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let (user, token) = {
            let mut session = self.write_session();
            let user = session.login(email, password)?.clone();
            (user, session.token().map(SecretString::from))
        };
        if let Some(client) = &self.inner.http {
            client.set_token(token);
        }
        set_sentry_user(&user.id, Some(&user.email));

        if let Err(e) = self.inner.engine.set_authenticated(true).await {
            e.report();
        }
        Ok(user)
    }

    /// Log out and switch back to the guest cart.
    pub async fn logout(&self) {
        self.write_session().logout();
        if let Some(client) = &self.inner.http {
            client.set_token(None);
        }
        clear_sentry_user();

        if let Err(e) = self.inner.engine.set_authenticated(false).await {
            e.report();
        }
        info!("Switched to guest cart");
    }

    /// Begin checkout over the current cart.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` when the cart has no items.
    pub fn start_checkout(&self) -> Result<CheckoutMachine, CheckoutError> {
        CheckoutMachine::start(
            self.inner.engine.clone(),
            self.inner.payment.clone(),
            self.inner.clock.clone(),
        )
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_session().is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.read_session().user().cloned()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &DemoCatalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<CartEngine> {
        &self.inner.engine
    }

    fn read_session(&self) -> std::sync::RwLockReadGuard<'_, AuthSession> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_session(&self) -> std::sync::RwLockWriteGuard<'_, AuthSession> {
        self.inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("session", &*self.read_session())
            .field("engine", &self.inner.engine)
            .finish_non_exhaustive()
    }
}
