//! Integration tests for the Gems storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gems-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `guest_checkout` - Guest cart through to a placed order
//! - `auth_switching` - Login and logout moving between cart stores
//! - `persistence` - Guest cart and session surviving a restart
//! - `remote_cart` - Authenticated cart against a mocked cart service
//!
//! Every test builds its own [`TestStorefront`] over a temporary data
//! directory, so tests never share state.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use gems_storefront::catalog::DemoCatalog;
use gems_storefront::checkout::{CheckoutForm, SimulatedPayment};
use gems_storefront::clock::FixedClock;
use gems_storefront::config::StorefrontConfig;
use gems_storefront::remote::InMemoryCartService;
use gems_storefront::state::AppState;
use gems_storefront::storage::FileStore;

/// Millisecond timestamp used by the fixed clock; yields order `ORD-012345`.
pub const FIXED_MILLIS: i64 = 1_700_000_012_345;

/// A storefront over a temporary directory and an in-process cart service.
pub struct TestStorefront {
    pub state: AppState,
    pub remote: Arc<InMemoryCartService>,
    dir: TempDir,
}

impl TestStorefront {
    /// Build a fresh storefront in a new temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let remote = Arc::new(InMemoryCartService::new(Arc::new(DemoCatalog::new())));
        let state = Self::state_in(dir.path(), remote.clone());
        Self { state, remote, dir }
    }

    /// Rebuild the state over the same directory and cart service, as a
    /// second process run would see it.
    #[must_use]
    pub fn restart(&self) -> AppState {
        Self::state_in(self.dir.path(), self.remote.clone())
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    fn state_in(dir: &Path, remote: Arc<InMemoryCartService>) -> AppState {
        let config = StorefrontConfig {
            data_dir: dir.to_path_buf(),
            payment_delay: Duration::ZERO,
            ..StorefrontConfig::default()
        };
        AppState::with_services(
            config,
            Arc::new(FileStore::new(dir)),
            remote,
            Arc::new(SimulatedPayment::new(Duration::ZERO)),
            Arc::new(FixedClock::from_millis(FIXED_MILLIS)),
        )
    }
}

impl Default for TestStorefront {
    fn default() -> Self {
        Self::new()
    }
}

/// A checkout form that passes every step with card payment.
#[must_use]
pub fn complete_form() -> CheckoutForm {
    let mut form = CheckoutForm {
        email: "amina@example.com".to_string(),
        first_name: "Amina".to_string(),
        last_name: "Benali".to_string(),
        phone: "+212600000000".to_string(),
        card_number: "4242424242424242".to_string(),
        expiry_date: "12/30".to_string(),
        cvv: "123".to_string(),
        card_name: "Amina Benali".to_string(),
        ..CheckoutForm::default()
    };
    form.shipping_address.street = "12 Rue Atlas".to_string();
    form.shipping_address.city = "Rabat".to_string();
    form.shipping_address.zip_code = "10000".to_string();
    form
}
