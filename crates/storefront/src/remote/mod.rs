//! Remote cart service clients.
//!
//! # Architecture
//!
//! - Authenticated carts live on a remote cart service; the service is the
//!   source of truth and every mutation returns the full updated cart
//! - [`CartService`] is the seam the cart engine talks to
//! - [`HttpCartClient`] speaks the REST API, [`InMemoryCartService`] keeps
//!   the cart in process (tests and offline demos)
//!
//! # Example
//!
//! ```rust,ignore
//! use gems_storefront::remote::{CartService, HttpCartClient};
//!
//! let client = HttpCartClient::new(base_url);
//! client.set_token(Some(token));
//!
//! let cart = client.add_item(ProductId::new("1"), 2, Default::default()).await?;
//! ```

mod conversions;
mod http;
mod memory;

pub use conversions::{RemoteCart, RemoteCartItem, RemoteCartResponse, convert_cart};
pub use http::HttpCartClient;
pub use memory::{InMemoryCartService, UnconfiguredCartService};

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use gems_core::{Cart, CartItemId, ProductId};

/// Boxed future returned by [`CartService`] methods.
///
/// The trait returns boxed futures instead of using `async fn` so it stays
/// usable as `Arc<dyn CartService>`.
pub type CartFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Errors that can occur when talking to the remote cart service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("cart service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Service answered with `success: false`.
    #[error("cart service rejected the request: {0}")]
    Rejected(String),

    /// Base URL cannot address cart endpoints.
    #[error("invalid cart service URL: {0}")]
    InvalidUrl(String),

    /// No cart service is configured for authenticated carts.
    #[error("no cart service configured")]
    NotConfigured,
}

/// Cart operations offered by the remote cart service.
///
/// Every mutation returns the complete cart as the service now sees it.
pub trait CartService: Send + Sync {
    fn get_cart(&self) -> CartFuture<'_, Cart>;

    fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> CartFuture<'_, Cart>;

    fn update_quantity(&self, item_id: CartItemId, quantity: i64) -> CartFuture<'_, Cart>;

    fn remove_item(&self, item_id: CartItemId) -> CartFuture<'_, Cart>;

    fn clear_cart(&self) -> CartFuture<'_, ()>;
}
