//! In-process cart services.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use gems_core::{Cart, CartItem, CartItemId, LineId, ProductId};

use super::{CartFuture, CartService, RemoteError};
use crate::catalog::ProductCatalog;

/// A cart service that keeps one cart in memory.
///
/// Behaves like the REST service: lines get server-style ids, adds merge by
/// product, and every mutation answers with the whole cart. Flip
/// [`set_available`](Self::set_available) off to simulate an outage.
pub struct InMemoryCartService {
    catalog: Arc<dyn ProductCatalog>,
    cart: Mutex<Cart>,
    available: AtomicBool,
}

impl InMemoryCartService {
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            catalog,
            cart: Mutex::new(Cart::empty()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle whether requests succeed. Unavailable requests fail with a
    /// 503 status.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Current server-side cart, bypassing availability.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Status {
                status: 503,
                body: "cart service unavailable".to_string(),
            })
        }
    }

    fn apply_add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Cart, RemoteError> {
        self.check_available()?;
        if quantity == 0 {
            return Err(RemoteError::Rejected("quantity must be positive".to_string()));
        }
        let product = self
            .catalog
            .find_by_id(product_id)
            .ok_or_else(|| RemoteError::Rejected(format!("product {product_id} not found")))?;

        let mut cart = self.lock();
        if !cart.increment(product_id, quantity) {
            let line = LineId::new(uuid::Uuid::new_v4().to_string());
            debug!(line_id = %line, product_id = %product_id, "New remote cart line");
            let image_url = product.primary_image().to_owned();
            cart.push(CartItem {
                id: CartItemId::Line(line),
                product_id: product.id,
                quantity,
                unit_price: product.price,
                name: product.name,
                image_url,
                options,
            });
        }
        Ok(cart.clone())
    }

    fn apply_update(&self, item_id: &CartItemId, quantity: i64) -> Result<Cart, RemoteError> {
        self.check_available()?;
        let mut cart = self.lock();
        if !cart.set_quantity(item_id, quantity) {
            return Err(RemoteError::Rejected(format!("cart item {} not found", item_id.key())));
        }
        Ok(cart.clone())
    }

    fn apply_remove(&self, item_id: &CartItemId) -> Result<Cart, RemoteError> {
        self.check_available()?;
        let mut cart = self.lock();
        if !cart.remove(item_id) {
            return Err(RemoteError::Rejected(format!("cart item {} not found", item_id.key())));
        }
        Ok(cart.clone())
    }
}

impl std::fmt::Debug for InMemoryCartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCartService")
            .field("cart", &*self.lock())
            .field("available", &self.available.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CartService for InMemoryCartService {
    fn get_cart(&self) -> CartFuture<'_, Cart> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self.snapshot())
        })
    }

    fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> CartFuture<'_, Cart> {
        Box::pin(async move { self.apply_add(&product_id, quantity, options) })
    }

    fn update_quantity(&self, item_id: CartItemId, quantity: i64) -> CartFuture<'_, Cart> {
        Box::pin(async move { self.apply_update(&item_id, quantity) })
    }

    fn remove_item(&self, item_id: CartItemId) -> CartFuture<'_, Cart> {
        Box::pin(async move { self.apply_remove(&item_id) })
    }

    fn clear_cart(&self) -> CartFuture<'_, ()> {
        Box::pin(async move {
            self.check_available()?;
            *self.lock() = Cart::empty();
            Ok(())
        })
    }
}

/// Stand-in used when no cart service URL is configured.
///
/// Every call fails with [`RemoteError::NotConfigured`], so authenticated
/// cart operations surface a clear error instead of silently going local.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCartService;

impl CartService for UnconfiguredCartService {
    fn get_cart(&self) -> CartFuture<'_, Cart> {
        Box::pin(async { Err(RemoteError::NotConfigured) })
    }

    fn add_item(
        &self,
        _product_id: ProductId,
        _quantity: u32,
        _options: serde_json::Map<String, serde_json::Value>,
    ) -> CartFuture<'_, Cart> {
        Box::pin(async { Err(RemoteError::NotConfigured) })
    }

    fn update_quantity(&self, _item_id: CartItemId, _quantity: i64) -> CartFuture<'_, Cart> {
        Box::pin(async { Err(RemoteError::NotConfigured) })
    }

    fn remove_item(&self, _item_id: CartItemId) -> CartFuture<'_, Cart> {
        Box::pin(async { Err(RemoteError::NotConfigured) })
    }

    fn clear_cart(&self) -> CartFuture<'_, ()> {
        Box::pin(async { Err(RemoteError::NotConfigured) })
    }
}
