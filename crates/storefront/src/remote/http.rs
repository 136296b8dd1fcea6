//! REST client for the remote cart service.
//!
//! Endpoints (relative to the configured base URL):
//!
//! | Operation         | Request                     |
//! |-------------------|-----------------------------|
//! | `get_cart`        | `GET    cart`               |
//! | `add_item`        | `POST   cart/items`         |
//! | `update_quantity` | `PUT    cart/items/{id}`    |
//! | `remove_item`     | `DELETE cart/items/{id}`    |
//! | `clear_cart`      | `DELETE cart`               |

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{Instrument, debug, debug_span};
use url::Url;

use gems_core::{Cart, CartItemId, ProductId};

use super::{CartFuture, CartService, RemoteCartResponse, RemoteError};

/// Client for the remote cart service.
///
/// Cheap to clone; clones share the bearer token.
#[derive(Clone)]
pub struct HttpCartClient {
    inner: Arc<HttpCartClientInner>,
}

struct HttpCartClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody<'a> {
    product_id: &'a str,
    quantity: u32,
    options: &'a serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct UpdateQuantityBody {
    quantity: i64,
}

impl HttpCartClient {
    /// Create a client for the service rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            inner: Arc::new(HttpCartClientInner {
                client: reqwest::Client::new(),
                base_url,
                token: RwLock::new(None),
            }),
        }
    }

    /// Replace the bearer token sent with every request.
    pub fn set_token(&self, token: Option<SecretString>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Build an endpoint URL from path segments below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the response body on success.
    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, RemoteError> {
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");

        let token = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.expose_secret().to_owned());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(status = %status, bytes = text.len(), "Cart service response");
        Ok(text)
    }

    async fn cart_request<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Cart, RemoteError> {
        let text = self.send(method, url, body).await?;
        serde_json::from_str::<RemoteCartResponse>(&text)?.into_cart()
    }
}

impl std::fmt::Debug for HttpCartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCartClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CartService for HttpCartClient {
    fn get_cart(&self) -> CartFuture<'_, Cart> {
        Box::pin(
            async move {
                let url = self.endpoint(&["cart"])?;
                self.cart_request::<()>(Method::GET, url, None).await
            }
            .instrument(debug_span!("get_cart")),
        )
    }

    fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> CartFuture<'_, Cart> {
        let span = debug_span!("add_item", product_id = %product_id, quantity);
        Box::pin(
            async move {
                let url = self.endpoint(&["cart", "items"])?;
                let body = AddItemBody {
                    product_id: product_id.as_str(),
                    quantity,
                    options: &options,
                };
                self.cart_request(Method::POST, url, Some(&body)).await
            }
            .instrument(span),
        )
    }

    fn update_quantity(&self, item_id: CartItemId, quantity: i64) -> CartFuture<'_, Cart> {
        let span = debug_span!("update_quantity", item_id = %item_id, quantity);
        Box::pin(
            async move {
                let url = self.endpoint(&["cart", "items", item_id.key()])?;
                let body = UpdateQuantityBody { quantity };
                self.cart_request(Method::PUT, url, Some(&body)).await
            }
            .instrument(span),
        )
    }

    fn remove_item(&self, item_id: CartItemId) -> CartFuture<'_, Cart> {
        let span = debug_span!("remove_item", item_id = %item_id);
        Box::pin(
            async move {
                let url = self.endpoint(&["cart", "items", item_id.key()])?;
                self.cart_request::<()>(Method::DELETE, url, None).await
            }
            .instrument(span),
        )
    }

    fn clear_cart(&self) -> CartFuture<'_, ()> {
        Box::pin(
            async move {
                let url = self.endpoint(&["cart"])?;
                self.send::<()>(Method::DELETE, url, None).await?;
                Ok(())
            }
            .instrument(debug_span!("clear_cart")),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use gems_core::LineId;

    fn client_for(server: &MockServer) -> HttpCartClient {
        let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        let client = HttpCartClient::new(base);
        client.set_token(Some(SecretString::from("demo-token-1")));
        client
    }

    fn cart_json() -> serde_json::Value {
        json!({
            "items": [
                {"_id": "ln-9", "productId": "2", "quantity": 1, "price": 1299,
                 "name": "Imperial Topaz Ring", "image": "/ring2.jpg"}
            ],
            "totalPrice": 1299
        })
    }

    #[tokio::test]
    async fn test_get_cart_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .and(header("authorization", "Bearer demo-token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json()))
            .expect(1)
            .mount(&server)
            .await;

        let cart = client_for(&server).get_cart().await.unwrap();
        assert_eq!(cart.items[0].id, CartItemId::Line(LineId::new("ln-9")));
        assert_eq!(cart.total_price, Decimal::new(1299, 0));
    }

    #[tokio::test]
    async fn test_add_item_posts_product_and_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cart/items"))
            .and(body_json(json!({
                "productId": "2",
                "quantity": 1,
                "options": {"size": "54"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "cart": cart_json()})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut options = serde_json::Map::new();
        options.insert("size".into(), json!("54"));
        let cart = client_for(&server)
            .add_item(ProductId::new("2"), 1, options)
            .await
            .unwrap();
        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_remove_address_line_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/cart/items/ln-9"))
            .and(body_json(json!({"quantity": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/items/ln-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let id = CartItemId::Line(LineId::new("ln-9"));
        client.update_quantity(id.clone(), 3).await.unwrap();
        let cart = client.remove_item(id).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).clear_cart().await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 503, ref body } if body == "maintenance"));
    }

    #[tokio::test]
    async fn test_unrecognized_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get_cart().await.unwrap_err();
        assert!(matches!(err, RemoteError::Parse(_)));
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let client = HttpCartClient::new(Url::parse("http://localhost:8080/api").unwrap());
        assert_eq!(
            client.endpoint(&["cart", "items", "a b"]).unwrap().as_str(),
            "http://localhost:8080/api/cart/items/a%20b"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = HttpCartClient::new(Url::parse("http://localhost/").unwrap());
        client.set_token(Some(SecretString::from("super-secret")));
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
    }
}
