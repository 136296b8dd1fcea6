//! Wire types for the remote cart service and their conversion into
//! [`Cart`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use gems_core::{Cart, CartItem, CartItemId, LineId, ProductId};

use super::RemoteError;

/// Cart payload as returned by the service.
///
/// Some endpoints wrap it in `{"success": true, "cart": {...}}`, others
/// return it bare. An object carrying `success` is always read as an
/// envelope; anything else must be a cart with an `items` array.
#[derive(Debug, Clone)]
pub enum RemoteCartResponse {
    Envelope {
        success: bool,
        cart: Option<RemoteCart>,
        message: Option<String>,
    },
    Bare(RemoteCart),
}

#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    cart: Option<RemoteCart>,
    #[serde(default)]
    message: Option<String>,
}

impl<'de> Deserialize<'de> for RemoteCartResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("success").is_some() {
            let Envelope {
                success,
                cart,
                message,
            } = Envelope::deserialize(value).map_err(<D::Error as de::Error>::custom)?;
            Ok(Self::Envelope {
                success,
                cart,
                message,
            })
        } else {
            RemoteCart::deserialize(value)
                .map(Self::Bare)
                .map_err(<D::Error as de::Error>::custom)
        }
    }
}

impl RemoteCartResponse {
    /// Unwrap the cart, turning `success: false` into an error.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when the envelope reports failure or carries no
    /// cart.
    pub fn into_cart(self) -> Result<Cart, RemoteError> {
        match self {
            Self::Bare(cart) => Ok(convert_cart(cart)),
            Self::Envelope {
                success: true,
                cart: Some(cart),
                ..
            } => Ok(convert_cart(cart)),
            Self::Envelope { message, .. } => Err(RemoteError::Rejected(
                message.unwrap_or_else(|| "no cart in response".to_string()),
            )),
        }
    }
}

/// A cart as the service serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    pub items: Vec<RemoteCartItem>,
    /// Absent on some endpoints; recomputed locally when missing.
    #[serde(default, alias = "total", skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

/// A cart line as the service serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCartItem {
    /// Server-issued line id.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "productId", alias = "productID")]
    pub product_id: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    /// Options echoed back from the add request.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Convert a service cart into the engine's [`Cart`].
///
/// Lines with a server id are keyed by it; lines without one fall back to
/// their product id. The service's total is trusted when present.
#[must_use]
pub fn convert_cart(remote: RemoteCart) -> Cart {
    let items: Vec<CartItem> = remote.items.into_iter().map(convert_item).collect();
    match remote.total_price {
        Some(total_price) => Cart { items, total_price },
        None => Cart::from_items(items),
    }
}

fn convert_item(item: RemoteCartItem) -> CartItem {
    let product_id = ProductId::new(item.product_id);
    let id = item.id.map_or_else(
        || CartItemId::Product(product_id.clone()),
        |line| CartItemId::Line(LineId::new(line)),
    );

    CartItem {
        id,
        product_id,
        quantity: item.quantity,
        unit_price: item.price,
        name: item.name,
        image_url: item.image,
        options: item.extra,
    }
}
