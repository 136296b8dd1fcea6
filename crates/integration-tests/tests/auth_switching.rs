//! Login and logout moving the cart between the guest store and the
//! remote cart service.

#![allow(clippy::unwrap_used)]

use gems_core::ProductId;
use gems_integration_tests::TestStorefront;
use gems_storefront::error::{CartError, CartOutcome};
use gems_storefront::session::AuthError;

#[tokio::test]
async fn test_login_switches_to_remote_cart_and_logout_restores_guest_cart() {
    let store = TestStorefront::new();
    let engine = store.state.engine();
    engine
        .add_item(ProductId::new("1"), 1, serde_json::Map::new())
        .await
        .unwrap();

    let user = store.state.login("amina@example.com", "secret").await.unwrap();
    assert_eq!(user.username, "amina");
    assert!(engine.is_authenticated());
    // The guest cart is not merged on login
    assert!(engine.cart().is_empty());

    engine
        .add_item(ProductId::new("2"), 1, serde_json::Map::new())
        .await
        .unwrap();
    assert!(engine.is_in_cart(&ProductId::new("2")));
    assert!(store.remote.snapshot().contains_product(&ProductId::new("2")));

    store.state.logout().await;
    assert!(!engine.is_authenticated());
    assert!(engine.is_in_cart(&ProductId::new("1")));
    assert!(!engine.is_in_cart(&ProductId::new("2")));
}

#[tokio::test]
async fn test_login_without_password_stays_guest() {
    let store = TestStorefront::new();
    let err = store.state.login("amina@example.com", "").await.unwrap_err();
    assert!(matches!(err, AuthError::MissingCredentials));
    assert!(!store.state.is_authenticated());
    assert!(!store.state.engine().is_authenticated());
}

#[tokio::test]
async fn test_unavailable_service_keeps_login_and_reports_mutations() {
    let store = TestStorefront::new();
    store.remote.set_available(false);

    store.state.login("amina@example.com", "secret").await.unwrap();
    assert!(store.state.is_authenticated());
    assert!(store.state.engine().cart().is_empty());

    let result = store
        .state
        .engine()
        .add_item(ProductId::new("1"), 1, serde_json::Map::new())
        .await;
    assert!(matches!(result, Err(CartError::Remote(_))));

    let outcome = CartOutcome::from(result);
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Could not reach the cart service, please try again")
    );
}

#[tokio::test]
async fn test_remote_rejection_message_reaches_shopper() {
    let store = TestStorefront::new();
    store.state.login("amina@example.com", "secret").await.unwrap();

    let outcome: CartOutcome = store
        .state
        .engine()
        .add_item(ProductId::new("999"), 1, serde_json::Map::new())
        .await
        .into();
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("product 999 not found"));
}
