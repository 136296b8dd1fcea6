//! Shopping cart: guest persistence and the reconciliation engine.
//!
//! [`CartEngine`] exposes one mutation contract for both modes. Guest carts
//! are persisted through [`GuestCartStore`]; authenticated carts delegate to
//! a [`CartService`](crate::remote::CartService).

mod engine;
mod guest;

pub use engine::CartEngine;
pub use guest::GuestCartStore;
