//! Product catalog.
//!
//! The cart engine only needs [`ProductCatalog::find_by_id`] to price new
//! guest lines. [`DemoCatalog`] also backs the product listing, which
//! filters and sorts the in-memory product list with a [`ProductQuery`].

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Deserialize;

use gems_core::{Product, ProductCategory, ProductId};

/// Lookup of catalog products by id.
pub trait ProductCatalog: Send + Sync {
    fn find_by_id(&self, id: &ProductId) -> Option<Product>;
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Catalog order.
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Filters for the product listing. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<ProductCategory>,
    /// Case-insensitive match against name and description.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort_by: SortBy,
}

impl ProductQuery {
    fn matches(&self, product: &Product) -> bool {
        if self.category.is_some_and(|c| c != product.category) {
            return false;
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        true
    }
}

/// The built-in jewelry catalog.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    products: Vec<Product>,
}

impl DemoCatalog {
    /// Catalog pre-loaded with the nine demo products.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: demo_products(),
        }
    }

    /// Catalog over an arbitrary product list.
    #[must_use]
    pub const fn with_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Filter and sort the catalog.
    #[must_use]
    pub fn search(&self, query: &ProductQuery) -> Vec<Product> {
        let mut found: Vec<Product> = self
            .products
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();

        match query.sort_by {
            SortBy::Newest => {}
            SortBy::PriceLow => found.sort_by(|a, b| a.price.cmp(&b.price)),
            SortBy::PriceHigh => found.sort_by(|a, b| b.price.cmp(&a.price)),
            SortBy::Rating => found.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
        }
        found
    }
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCatalog for DemoCatalog {
    fn find_by_id(&self, id: &ProductId) -> Option<Product> {
        self.products.iter().find(|p| &p.id == id).cloned()
    }
}

fn demo_products() -> Vec<Product> {
    let product = |id: &str,
                   name: &str,
                   description: &str,
                   price: i64,
                   image: &str,
                   category: ProductCategory,
                   rating: f64,
                   reviews: u32| Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        price: Decimal::new(price, 0),
        images: vec![format!("/images/products/{image}.jpg")],
        category,
        rating,
        reviews,
    };

    vec![
        product(
            "1",
            "Diamond Solitaire Ring",
            "18k white gold solitaire ring with a one-carat diamond",
            2999,
            "ring1",
            ProductCategory::Rings,
            4.9,
            127,
        ),
        product(
            "2",
            "Imperial Topaz Ring",
            "Elegant ring set with imperial topaz and diamonds",
            1299,
            "ring2",
            ProductCategory::Rings,
            4.8,
            89,
        ),
        product(
            "3",
            "Yellow Gold Moissanite Ring",
            "18k yellow gold engagement ring with moissanite",
            899,
            "ring3",
            ProductCategory::Rings,
            4.7,
            156,
        ),
        product(
            "4",
            "Gold Statement Necklace",
            "Gold statement necklace with a geometric design",
            599,
            "necklace1",
            ProductCategory::Necklaces,
            4.6,
            73,
        ),
        product(
            "5",
            "Sophia Set",
            "Necklace with matching earrings",
            799,
            "necklace2",
            ProductCategory::Necklaces,
            4.8,
            92,
        ),
        product(
            "6",
            "21k Gold Clover Necklace",
            "Modern 21k gold clover pendant necklace",
            1199,
            "necklace3",
            ProductCategory::Necklaces,
            4.9,
            64,
        ),
        product(
            "7",
            "Friendship Wave Bracelets",
            "Set of two gold and silver wave bracelets",
            149,
            "bracelet1",
            ProductCategory::Bracelets,
            4.5,
            203,
        ),
        product(
            "8",
            "Gold Stack Bracelets",
            "Collection of stackable gold bracelets",
            299,
            "bracelet2",
            ProductCategory::Bracelets,
            4.7,
            118,
        ),
        product(
            "9",
            "Gold Plated Bracelets",
            "Trendy 14k gold plated bracelets",
            199,
            "bracelet3",
            ProductCategory::Bracelets,
            4.6,
            87,
        ),
    ]
}
