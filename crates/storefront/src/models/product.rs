//! Product domain types.

use serde::{Deserialize, Serialize};

use crumb_haven_core::{Price, ProductFeatureId, ProductId, Slug};

/// A catalog product (domain type).
///
/// Immutable from the API's perspective: there is no update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Numeric product ID.
    pub id: ProductId,
    /// Unique URL-safe identifier.
    pub slug: Slug,
    /// Display name.
    pub name: String,
    /// Long-form description shown on the detail page.
    pub description: String,
    /// One-line summary shown on product cards.
    pub short_description: String,
    /// Category used for client-side filtering (e.g. "cookies").
    pub category: String,
    /// Optional badge such as "Bestseller" or "New".
    pub badge: Option<String>,
    /// List price.
    pub price: Price,
    /// Discounted price, when on sale.
    pub sale_price: Option<Price>,
    /// Product image reference.
    pub image_url: String,
    /// Whether the product appears in the featured list.
    #[serde(default)]
    pub is_featured: bool,
}

/// A single descriptive line belonging to exactly one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFeature {
    pub id: ProductFeatureId,
    pub product_id: ProductId,
    pub feature: String,
    /// Ordering within the product (ascending).
    pub position: i32,
}

/// Product detail payload: the product plus its ordered feature lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub product: Product,
    pub features: Vec<String>,
}

impl ProductDetails {
    /// Assemble details from a product and its features in any order.
    ///
    /// Features are sorted by position (ties keep ID order).
    #[must_use]
    pub fn new(product: Product, mut features: Vec<ProductFeature>) -> Self {
        features.sort_by_key(|f| (f.position, f.id.as_i32()));
        Self {
            product,
            features: features.into_iter().map(|f| f.feature).collect(),
        }
    }
}
