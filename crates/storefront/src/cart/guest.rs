//! Guest cart persistence.
//!
//! The guest cart is stored under [`keys::GUEST_CART`] in the shape the
//! storefront has always written:
//!
//! ```json
//! {"items":[{"productID":"1","quantity":2,"price":2999,"name":"...","image":"...","size":"52"}],"totalPrice":5998}
//! ```
//!
//! Extra keys on an item are the caller's add-to-cart options.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use gems_core::{Cart, CartItem, CartItemId, ProductId};

use crate::storage::{LocalStore, StorageError, keys};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCart {
    #[serde(default)]
    items: Vec<StoredItem>,
    #[serde(default)]
    total_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredItem {
    #[serde(rename = "productID", alias = "productId")]
    product_id: String,
    quantity: u32,
    price: Decimal,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<&Cart> for StoredCart {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| StoredItem {
                    product_id: item.product_id.as_str().to_owned(),
                    quantity: item.quantity,
                    price: item.unit_price,
                    name: item.name.clone(),
                    image: item.image_url.clone(),
                    extra: item.options.clone(),
                })
                .collect(),
            total_price: cart.total_price,
        }
    }
}

impl From<StoredCart> for Cart {
    /// Guest items are always keyed by product. Lines with a zero quantity
    /// are dropped and the total is recomputed from what remains.
    fn from(stored: StoredCart) -> Self {
        let items = stored
            .items
            .into_iter()
            .filter(|item| item.quantity > 0)
            .map(|item| {
                let product_id = ProductId::new(item.product_id);
                CartItem {
                    id: CartItemId::Product(product_id.clone()),
                    product_id,
                    quantity: item.quantity,
                    unit_price: item.price,
                    name: item.name,
                    image_url: item.image,
                    options: item.extra,
                }
            })
            .collect();
        Self::from_items(items)
    }
}

/// Reads and writes the guest cart snapshot.
#[derive(Clone)]
pub struct GuestCartStore {
    store: Arc<dyn LocalStore>,
}

impl GuestCartStore {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Load the stored guest cart.
    ///
    /// Missing or unparseable data yields an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        let Some(raw) = self.store.get(keys::GUEST_CART) else {
            return Cart::empty();
        };
        match serde_json::from_str::<StoredCart>(&raw) {
            Ok(stored) => stored.into(),
            Err(e) => {
                warn!("Discarding corrupt guest cart: {e}");
                Cart::empty()
            }
        }
    }

    /// Persist a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(&StoredCart::from(cart))?;
        self.store.set(keys::GUEST_CART, &json)
    }

    /// Remove the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store refuses the removal.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::GUEST_CART)
    }
}

impl std::fmt::Debug for GuestCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestCartStore").finish_non_exhaustive()
    }
}
