//! Gems storefront library.
//!
//! Cart reconciliation across guest and authenticated storage, the
//! checkout step machine, and the adapters they run on (local storage, the
//! remote cart service, the product catalog and the auth session).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod error;
pub mod remote;
pub mod session;
pub mod state;
pub mod storage;
