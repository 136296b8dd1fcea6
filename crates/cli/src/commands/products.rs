//! Catalog listing.

use rust_decimal::Decimal;

use gems_core::ProductCategory;
use gems_storefront::catalog::{ProductQuery, SortBy};
use gems_storefront::state::AppState;

use crate::output;

pub fn list(
    state: &AppState,
    category: Option<ProductCategory>,
    search: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    sort_by: SortBy,
) {
    let query = ProductQuery {
        category,
        search,
        min_price,
        max_price,
        sort_by,
    };
    output::products(&state.catalog().search(&query));
}
