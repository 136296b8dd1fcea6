//! Command implementations.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use gems_storefront::state::AppState;

use crate::output;

/// Load the cart for the current session before a cart command.
///
/// A failed authenticated fetch is reported and the command continues on
/// an empty view.
pub async fn sync_cart(state: &AppState) {
    if let Err(e) = state.init().await {
        e.report();
        output::failure(&e.message());
    }
}
