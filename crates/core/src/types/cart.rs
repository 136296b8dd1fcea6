//! Cart and cart item types.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s plus a cached total. The
//! total always equals the sum of `unit_price * quantity` after any mutation
//! made through the methods on this type. Carts received from a remote
//! service carry the service's total instead, which callers trust as-is.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{LineId, ProductId};

/// Identity of an item within a cart.
///
/// Guest carts key their items by product, while carts owned by the remote
/// cart service key them by a server-issued line id. Both schemes flow
/// through this one type so callers never have to know which store a cart
/// came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartItemId {
    /// Keyed by catalog product (guest carts).
    Product(ProductId),
    /// Keyed by server-issued line id (authenticated carts).
    Line(LineId),
}

impl CartItemId {
    /// The raw key, without the scheme prefix.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Product(id) => id.as_str(),
            Self::Line(id) => id.as_str(),
        }
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product:{id}"),
            Self::Line(id) => write!(f, "line:{id}"),
        }
    }
}

impl From<ProductId> for CartItemId {
    fn from(id: ProductId) -> Self {
        Self::Product(id)
    }
}

impl From<LineId> for CartItemId {
    fn from(id: LineId) -> Self {
        Self::Line(id)
    }
}

/// A single line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Always at least 1; a line that would drop to 0 is removed instead.
    pub quantity: u32,
    pub unit_price: Decimal,
    pub name: String,
    pub image_url: String,
    /// Caller-supplied extras (size, engraving, ...) carried verbatim.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl CartItem {
    /// Price of this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Multiply a unit price by a quantity, saturating instead of overflowing.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or(Decimal::MAX)
}

/// A shopping cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
}

impl Cart {
    /// An empty cart with a zero total.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cart from items, computing the total.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            items,
            total_price: Decimal::ZERO,
        };
        cart.recompute_total();
        cart
    }

    /// Sum of line totals over the current items.
    #[must_use]
    pub fn computed_total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()))
    }

    /// Refresh `total_price` from the items.
    pub fn recompute_total(&mut self) {
        self.total_price = self.computed_total();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether any line refers to the given product.
    #[must_use]
    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Find a line by its identity.
    #[must_use]
    pub fn find(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add units to the line for `product_id`, if one exists.
    ///
    /// Returns `false` when no line matches, leaving the cart untouched.
    pub fn increment(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
        else {
            return false;
        };
        item.quantity = item.quantity.saturating_add(quantity);
        self.recompute_total();
        true
    }

    /// Append a new line and refresh the total.
    pub fn push(&mut self, item: CartItem) {
        self.items.push(item);
        self.recompute_total();
    }

    /// Set the quantity of a line; zero or negative removes it.
    ///
    /// Quantities above `u32::MAX` saturate. Returns `false` when no line
    /// matches.
    pub fn set_quantity(&mut self, id: &CartItemId, quantity: i64) -> bool {
        let Some(index) = self.items.iter().position(|item| &item.id == id) else {
            return false;
        };
        if quantity <= 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.recompute_total();
        true
    }

    /// Remove a line. Returns `false` when no line matches.
    pub fn remove(&mut self, id: &CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.recompute_total();
        }
        removed
    }
}
