//! Authenticated cart against a mocked cart service.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gems_core::{CartItemId, LineId, ProductId};
use gems_storefront::config::StorefrontConfig;
use gems_storefront::error::CartOutcome;
use gems_storefront::state::AppState;

fn state_for(server: &MockServer, dir: &tempfile::TempDir) -> AppState {
    AppState::new(StorefrontConfig {
        data_dir: dir.path().to_path_buf(),
        cart_api_url: Some(Url::parse(&format!("{}/api/", server.uri())).unwrap()),
        payment_delay: Duration::ZERO,
        sentry_dsn: None,
    })
}

fn cart_body(quantity: u32) -> serde_json::Value {
    json!({
        "success": true,
        "cart": {
            "items": [
                {"_id": "ln-1", "productId": "3", "quantity": quantity, "price": 899,
                 "name": "Yellow Gold Moissanite Ring", "image": "/ring3.jpg"}
            ],
            "totalPrice": 899 * quantity
        }
    })
}

#[tokio::test]
async fn test_authenticated_cart_follows_service_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/cart/items/ln-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(4)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&server, &dir);
    state.login("amina@example.com", "secret").await.unwrap();
    let engine = state.engine();
    assert!(engine.cart().is_empty());

    engine
        .add_item(ProductId::new("3"), 1, serde_json::Map::new())
        .await
        .unwrap();
    let id = engine.resolve_item_id("ln-1").unwrap();
    assert_eq!(id, CartItemId::Line(LineId::new("ln-1")));

    engine.update_quantity(id, 4).await.unwrap();
    assert_eq!(engine.total_item_count(), 4);
    assert_eq!(engine.total_price(), Decimal::new(3596, 0));
}

#[tokio::test]
async fn test_failed_fetch_keeps_last_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&server, &dir);
    state.login("amina@example.com", "secret").await.unwrap();
    assert_eq!(state.engine().total_item_count(), 2);

    let outcome = CartOutcome::from(state.engine().load().await);
    assert!(!outcome.success);
    assert_eq!(state.engine().total_item_count(), 2);
}

#[tokio::test]
async fn test_clear_empties_view_even_when_service_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(1)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&server, &dir);
    state.login("amina@example.com", "secret").await.unwrap();
    assert!(!state.engine().cart().is_empty());

    assert!(state.engine().clear().await.is_err());
    assert!(state.engine().cart().is_empty());
}

#[tokio::test]
async fn test_guest_mode_never_calls_service() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&server, &dir);
    state.init().await.unwrap();
    state
        .engine()
        .add_item(ProductId::new("3"), 1, serde_json::Map::new())
        .await
        .unwrap();
    assert_eq!(state.engine().total_price(), Decimal::new(899, 0));
}

#[tokio::test]
async fn test_unrecognized_response_keeps_cart_and_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(2)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Unauthorized"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&server, &dir);
    state.login("amina@example.com", "secret").await.unwrap();

    let outcome = CartOutcome::from(
        state
            .engine()
            .add_item(ProductId::new("1"), 1, serde_json::Map::new())
            .await,
    );
    assert!(!outcome.success);
    assert_eq!(state.engine().total_item_count(), 2);
    assert!(state.engine().is_in_cart(&ProductId::new("3")));
}
