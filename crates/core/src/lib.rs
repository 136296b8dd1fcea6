//! Gems Core - Shared types library.
//!
//! This crate provides the domain types used across the Gems storefront:
//! - `gems-storefront` - Cart reconciliation engine and checkout flow
//! - `gems-cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, prices, products, carts and payment enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
