//! Core types for the Gems storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem, CartItemId, line_total};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductCategory};
pub use status::PaymentMethod;
