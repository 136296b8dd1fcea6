//! Cart commands.

use gems_core::{CartItemId, ProductId};
use gems_storefront::error::CartError;
use gems_storefront::state::AppState;

use crate::output;

/// Parse a `key=value` option.
pub fn parse_option(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("option key is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn show(state: &AppState) {
    output::cart(&state.engine().cart());
}

pub async fn add(
    state: &AppState,
    product_id: &str,
    quantity: u32,
    options: Vec<(String, String)>,
) -> Result<(), CartError> {
    let options = options
        .into_iter()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect();
    let result = state
        .engine()
        .add_item(ProductId::new(product_id), quantity, options)
        .await;
    finish(state, result)
}

pub async fn update(state: &AppState, item: &str, quantity: i64) -> Result<(), CartError> {
    let id = resolve(state, item);
    let result = state.engine().update_quantity(id, quantity).await;
    finish(state, result)
}

pub async fn remove(state: &AppState, item: &str) -> Result<(), CartError> {
    let id = resolve(state, item);
    let result = state.engine().remove_item(id).await;
    finish(state, result)
}

pub async fn clear(state: &AppState) -> Result<(), CartError> {
    let result = state.engine().clear().await;
    finish(state, result)
}

/// Map a typed key to a line, defaulting to a product-keyed id.
fn resolve(state: &AppState, item: &str) -> CartItemId {
    state
        .engine()
        .resolve_item_id(item)
        .unwrap_or_else(|| CartItemId::Product(ProductId::new(item)))
}

fn finish(state: &AppState, result: Result<(), CartError>) -> Result<(), CartError> {
    match result {
        Ok(()) => {
            output::cart(&state.engine().cart());
            Ok(())
        }
        Err(e) => {
            e.report();
            output::failure(&e.message());
            Err(e)
        }
    }
}
