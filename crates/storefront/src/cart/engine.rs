//! The cart reconciliation engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use gems_core::{Cart, CartItem, CartItemId, ProductId};

use super::GuestCartStore;
use crate::catalog::ProductCatalog;
use crate::error::CartError;
use crate::remote::CartService;
use crate::storage::LocalStore;

/// Owns the session's cart and routes every mutation to the right store.
///
/// In guest mode the cart lives in local storage; once authenticated the
/// remote cart service is the source of truth and each response replaces
/// the local view. The current snapshot is published on a `watch` channel.
///
/// Methods take `&self`. Two authenticated mutations racing on a shared
/// engine resolve in response order, so a slow earlier response can
/// overwrite a newer one.
pub struct CartEngine {
    guest: GuestCartStore,
    remote: Arc<dyn CartService>,
    catalog: Arc<dyn ProductCatalog>,
    authenticated: AtomicBool,
    cart: watch::Sender<Cart>,
}

impl CartEngine {
    /// Create an engine in guest mode with an empty cart.
    ///
    /// Call [`load`](Self::load) to read the stored guest cart.
    #[must_use]
    pub fn new(
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn CartService>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        let (cart, _) = watch::channel(Cart::empty());
        Self {
            guest: GuestCartStore::new(store),
            remote,
            catalog,
            authenticated: AtomicBool::new(false),
            cart,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Switch between guest and authenticated mode, reloading on change.
    ///
    /// The guest cart is not merged into the authenticated cart. It stays
    /// in local storage and reappears after logout.
    ///
    /// # Errors
    ///
    /// Returns the reload error when the authenticated cart cannot be
    /// fetched; the mode switch itself still takes effect.
    #[instrument(skip(self))]
    pub async fn set_authenticated(&self, authenticated: bool) -> Result<(), CartError> {
        let previous = self.authenticated.swap(authenticated, Ordering::SeqCst);
        if previous == authenticated {
            return Ok(());
        }
        info!(authenticated, "Cart mode changed, reloading");
        if authenticated {
            // The guest cart is abandoned in the engine's view
            self.publish(Cart::empty());
        }
        self.load().await
    }

    /// Populate the cart from the current mode's store.
    ///
    /// Guest mode never fails. In authenticated mode a failed fetch leaves
    /// the current cart untouched.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the authenticated cart cannot be
    /// fetched.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), CartError> {
        if !self.is_authenticated() {
            self.publish(self.guest.load());
            return Ok(());
        }

        match self.remote.get_cart().await {
            Ok(cart) => {
                self.publish(cart);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load cart, keeping current state: {e}");
                Err(e.into())
            }
        }
    }

    /// Add units of a product, merging into an existing line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a zero quantity, `ProductNotFound` when
    /// a guest add names an unknown product, or the remote error in
    /// authenticated mode. The cart is unchanged on error.
    #[instrument(skip(self, options), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if self.is_authenticated() {
            let cart = self.remote.add_item(product_id, quantity, options).await?;
            self.publish(cart);
            return Ok(());
        }

        let mut cart = self.cart();
        if !cart.increment(&product_id, quantity) {
            let product = self
                .catalog
                .find_by_id(&product_id)
                .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;
            let image_url = product.primary_image().to_owned();
            cart.push(CartItem {
                id: CartItemId::Product(product_id.clone()),
                product_id,
                quantity,
                unit_price: product.price,
                name: product.name,
                image_url,
                options,
            });
        }
        self.commit_guest(cart);
        Ok(())
    }

    /// Set a line's quantity; zero or negative removes the line.
    ///
    /// An unknown id is a no-op in guest mode.
    ///
    /// # Errors
    ///
    /// Returns the remote error in authenticated mode.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if self.is_authenticated() {
            let cart = self.remote.update_quantity(item_id, quantity).await?;
            self.publish(cart);
            return Ok(());
        }

        let mut cart = self.cart();
        if cart.set_quantity(&item_id, quantity) {
            self.commit_guest(cart);
        } else {
            debug!("No such cart item, ignoring update");
        }
        Ok(())
    }

    /// Remove a line. Removing an absent line is a no-op in guest mode.
    ///
    /// # Errors
    ///
    /// Returns the remote error in authenticated mode.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<(), CartError> {
        if self.is_authenticated() {
            let cart = self.remote.remove_item(item_id).await?;
            self.publish(cart);
            return Ok(());
        }

        let mut cart = self.cart();
        if cart.remove(&item_id) {
            self.commit_guest(cart);
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// The local cart is empty afterwards in every case.
    ///
    /// # Errors
    ///
    /// In authenticated mode, returns the remote error if the service
    /// could not clear its copy.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        if self.is_authenticated() {
            let result = self.remote.clear_cart().await;
            self.publish(Cart::empty());
            if let Err(e) = &result {
                warn!("Remote cart clear failed, local cart reset anyway: {e}");
            }
            return result.map_err(CartError::from);
        }

        if let Err(e) = self.guest.clear() {
            warn!("Failed to remove stored guest cart: {e}");
        }
        self.publish(Cart::empty());
        Ok(())
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// Receiver notified with every new snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.borrow().total_item_count()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.borrow().total_price
    }

    #[must_use]
    pub fn is_in_cart(&self, product_id: &ProductId) -> bool {
        self.cart.borrow().contains_product(product_id)
    }

    /// Find the line a user-typed key refers to.
    ///
    /// Matches the line's own key first, then its product id.
    #[must_use]
    pub fn resolve_item_id(&self, key: &str) -> Option<CartItemId> {
        let cart = self.cart.borrow();
        cart.items
            .iter()
            .find(|item| item.id.key() == key)
            .or_else(|| cart.items.iter().find(|item| item.product_id.as_str() == key))
            .map(|item| item.id.clone())
    }

    fn publish(&self, cart: Cart) {
        self.cart.send_replace(cart);
    }

    fn commit_guest(&self, cart: Cart) {
        if let Err(e) = self.guest.save(&cart) {
            warn!("Failed to persist guest cart: {e}");
        }
        self.publish(cart);
    }
}

impl std::fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("authenticated", &self.is_authenticated())
            .field("cart", &*self.cart.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::catalog::DemoCatalog;
    use crate::remote::{CartFuture, InMemoryCartService, RemoteError};
    use crate::storage::{MemoryStore, keys};

    struct Fixture {
        store: Arc<MemoryStore>,
        remote: Arc<InMemoryCartService>,
        engine: CartEngine,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(DemoCatalog::new());
        let remote = Arc::new(InMemoryCartService::new(catalog.clone()));
        let engine = CartEngine::new(store.clone(), remote.clone(), catalog);
        Fixture {
            store,
            remote,
            engine,
        }
    }

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    fn no_options() -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }

    #[tokio::test]
    async fn test_guest_add_merges_same_product() {
        let f = fixture();
        f.engine.add_item(pid("1"), 2, no_options()).await.unwrap();
        f.engine.add_item(pid("1"), 3, no_options()).await.unwrap();

        let cart = f.engine.cart();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(f.engine.total_price(), Decimal::new(2999 * 5, 0));
        assert_eq!(f.engine.total_item_count(), 5);
    }

    #[tokio::test]
    async fn test_guest_add_uses_catalog_metadata_and_persists() {
        let f = fixture();
        let mut options = no_options();
        options.insert("size".into(), serde_json::json!("54"));
        f.engine.add_item(pid("2"), 1, options).await.unwrap();

        let item = &f.engine.cart().items[0];
        assert_eq!(item.name, "Imperial Topaz Ring");
        assert_eq!(item.image_url, "/images/products/ring2.jpg");
        assert_eq!(item.options.get("size").unwrap(), "54");

        let stored = f.store.get(keys::GUEST_CART).unwrap();
        assert!(stored.contains("\"productID\":\"2\""));
    }

    #[tokio::test]
    async fn test_guest_add_unknown_product_is_rejected() {
        let f = fixture();
        let err = f.engine.add_item(pid("404"), 1, no_options()).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(ref id) if id.as_str() == "404"));
        assert!(f.engine.cart().is_empty());
        assert!(f.store.get(keys::GUEST_CART).is_none());
    }

    #[tokio::test]
    async fn test_zero_quantity_add_is_rejected() {
        let f = fixture();
        assert!(matches!(
            f.engine.add_item(pid("1"), 0, no_options()).await,
            Err(CartError::InvalidQuantity)
        ));
    }

    #[tokio::test]
    async fn test_update_to_zero_or_negative_removes() {
        let f = fixture();
        f.engine.add_item(pid("1"), 1, no_options()).await.unwrap();
        f.engine.add_item(pid("7"), 2, no_options()).await.unwrap();

        f.engine
            .update_quantity(CartItemId::Product(pid("1")), 0)
            .await
            .unwrap();
        assert!(!f.engine.is_in_cart(&pid("1")));

        f.engine
            .update_quantity(CartItemId::Product(pid("7")), -5)
            .await
            .unwrap();
        assert!(f.engine.cart().is_empty());
        assert_eq!(f.engine.total_price(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_item_is_a_guest_no_op() {
        let f = fixture();
        f.engine.add_item(pid("3"), 1, no_options()).await.unwrap();
        let before = f.engine.cart();

        f.engine
            .update_quantity(CartItemId::Product(pid("9")), 4)
            .await
            .unwrap();
        f.engine
            .remove_item(CartItemId::Product(pid("9")))
            .await
            .unwrap();
        assert_eq!(f.engine.cart(), before);
    }

    #[tokio::test]
    async fn test_guest_clear_removes_stored_cart() {
        let f = fixture();
        f.engine.add_item(pid("4"), 1, no_options()).await.unwrap();
        f.engine.clear().await.unwrap();

        assert_eq!(f.engine.cart(), Cart::empty());
        assert!(f.store.get(keys::GUEST_CART).is_none());
    }

    #[tokio::test]
    async fn test_load_survives_corrupt_guest_cart() {
        let f = fixture();
        f.store.set(keys::GUEST_CART, "not json at all").unwrap();
        f.engine.load().await.unwrap();
        assert_eq!(f.engine.cart(), Cart::empty());
    }

    #[tokio::test]
    async fn test_authenticated_mutations_trust_service_response() {
        let f = fixture();
        f.engine.set_authenticated(true).await.unwrap();
        f.engine.add_item(pid("8"), 2, no_options()).await.unwrap();

        let cart = f.engine.cart();
        assert_eq!(cart, f.remote.snapshot());
        let line = cart.items[0].id.clone();
        assert!(matches!(line, CartItemId::Line(_)));

        f.engine.update_quantity(line.clone(), 3).await.unwrap();
        assert_eq!(f.engine.total_price(), Decimal::new(299 * 3, 0));

        f.engine.remove_item(line).await.unwrap();
        assert!(f.engine.cart().is_empty());
        // Authenticated carts never touch guest storage
        assert!(f.store.get(keys::GUEST_CART).is_none());
    }

    #[tokio::test]
    async fn test_failed_authenticated_load_keeps_stale_cart() {
        let f = fixture();
        f.engine.set_authenticated(true).await.unwrap();
        f.engine.add_item(pid("1"), 1, no_options()).await.unwrap();
        let before = f.engine.cart();

        f.remote.set_available(false);
        let err = f.engine.load().await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Remote(RemoteError::Status { status: 503, .. })
        ));
        assert_eq!(f.engine.cart(), before);

        let err = f.engine.add_item(pid("2"), 1, no_options()).await.unwrap_err();
        assert!(matches!(err, CartError::Remote(_)));
        assert_eq!(f.engine.cart(), before);
    }

    #[tokio::test]
    async fn test_authenticated_clear_empties_even_when_service_fails() {
        let f = fixture();
        f.engine.set_authenticated(true).await.unwrap();
        f.engine.add_item(pid("6"), 1, no_options()).await.unwrap();

        f.remote.set_available(false);
        assert!(f.engine.clear().await.is_err());
        assert_eq!(f.engine.cart(), Cart::empty());
    }

    #[tokio::test]
    async fn test_login_abandons_guest_cart() {
        let f = fixture();
        f.engine.add_item(pid("5"), 1, no_options()).await.unwrap();

        f.engine.set_authenticated(true).await.unwrap();
        // Not merged into the authenticated cart
        assert!(f.engine.cart().is_empty());
        assert!(f.remote.snapshot().is_empty());
        assert!(f.store.get(keys::GUEST_CART).is_some());

        // Logging out brings the untouched guest cart back
        f.engine.set_authenticated(false).await.unwrap();
        assert!(f.engine.is_in_cart(&pid("5")));
    }

    #[tokio::test]
    async fn test_subscribers_see_each_snapshot() {
        let f = fixture();
        let mut rx = f.engine.subscribe();
        f.engine.add_item(pid("9"), 1, no_options()).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_item_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_item_id_matches_line_or_product() {
        let f = fixture();
        f.engine.set_authenticated(true).await.unwrap();
        f.engine.add_item(pid("3"), 1, no_options()).await.unwrap();
        let line = f.engine.cart().items[0].id.clone();

        assert_eq!(f.engine.resolve_item_id(line.key()), Some(line.clone()));
        assert_eq!(f.engine.resolve_item_id("3"), Some(line));
        assert_eq!(f.engine.resolve_item_id("nope"), None);
    }

    /// Applies each add immediately, then answers after a scripted delay.
    struct DelayedService {
        inner: InMemoryCartService,
        delays: Mutex<VecDeque<Duration>>,
    }

    impl CartService for DelayedService {
        fn get_cart(&self) -> CartFuture<'_, Cart> {
            self.inner.get_cart()
        }

        fn add_item(
            &self,
            product_id: ProductId,
            quantity: u32,
            options: serde_json::Map<String, serde_json::Value>,
        ) -> CartFuture<'_, Cart> {
            let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
            Box::pin(async move {
                let result = self.inner.add_item(product_id, quantity, options).await;
                tokio::time::sleep(delay).await;
                result
            })
        }

        fn update_quantity(&self, item_id: CartItemId, quantity: i64) -> CartFuture<'_, Cart> {
            self.inner.update_quantity(item_id, quantity)
        }

        fn remove_item(&self, item_id: CartItemId) -> CartFuture<'_, Cart> {
            self.inner.remove_item(item_id)
        }

        fn clear_cart(&self) -> CartFuture<'_, ()> {
            self.inner.clear_cart()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_racing_authenticated_adds_are_last_response_wins() {
        let catalog = Arc::new(DemoCatalog::new());
        let service = Arc::new(DelayedService {
            inner: InMemoryCartService::new(catalog.clone()),
            delays: Mutex::new(VecDeque::from([
                Duration::from_millis(100),
                Duration::from_millis(10),
            ])),
        });
        let engine = CartEngine::new(Arc::new(MemoryStore::new()), service.clone(), catalog);
        engine.set_authenticated(true).await.unwrap();

        let (first, second) = tokio::join!(
            engine.add_item(pid("1"), 1, no_options()),
            engine.add_item(pid("2"), 1, no_options()),
        );
        first.unwrap();
        second.unwrap();

        // The service holds both lines, but the slower first response
        // arrived last and overwrote the newer snapshot.
        assert_eq!(service.inner.snapshot().items.len(), 2);
        let cart = engine.cart();
        assert_eq!(cart.items.len(), 1);
        assert!(engine.is_in_cart(&pid("1")));
        assert!(!engine.is_in_cart(&pid("2")));
    }
}
