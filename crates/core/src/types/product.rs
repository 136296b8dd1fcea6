//! Catalog product types.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Product category used by the listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Rings,
    Necklaces,
    Bracelets,
    Earrings,
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rings => write!(f, "rings"),
            Self::Necklaces => write!(f, "necklaces"),
            Self::Bracelets => write!(f, "bracelets"),
            Self::Earrings => write!(f, "earrings"),
        }
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rings" => Ok(Self::Rings),
            "necklaces" => Ok(Self::Necklaces),
            "bracelets" => Ok(Self::Bracelets),
            "earrings" => Ok(Self::Earrings),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Short marketing description.
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image URLs, primary first.
    pub images: Vec<String>,
    pub category: ProductCategory,
    /// Average review rating (0.0 - 5.0).
    pub rating: f64,
    /// Number of reviews behind `rating`.
    pub reviews: u32,
}

impl Product {
    /// The first image URL, or an empty string when the product has none.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }
}
