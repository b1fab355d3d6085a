//! Bundled seed catalog.
//!
//! The catalog JSON backs the in-memory store, `crumb-cli seed`, and
//! `crumb-cli snapshot export --from-seed`.

use serde::{Deserialize, Serialize};

use super::{Product, ProductDetails, Testimonial};

const BUNDLED_CATALOG: &str = include_str!("../../seed/catalog.json");

/// A product together with its feature lines, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub features: Vec<String>,
}

impl SeedProduct {
    /// Detail payload for this product.
    #[must_use]
    pub fn details(&self) -> ProductDetails {
        ProductDetails {
            product: self.product.clone(),
            features: self.features.clone(),
        }
    }
}

/// A complete catalog: products with features, and testimonials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCatalog {
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
}

impl SeedCatalog {
    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled JSON does not match the model.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value fails validation
    /// (bad slug, negative price).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn product_list(&self) -> Vec<Product> {
        self.products.iter().map(|p| p.product.clone()).collect()
    }

    /// Featured products, in catalog order.
    #[must_use]
    pub fn featured_products(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.product.is_featured)
            .map(|p| p.product.clone())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = SeedCatalog::bundled().unwrap();
        assert!(!catalog.products.is_empty());
        assert!(!catalog.testimonials.is_empty());
    }

    #[test]
    fn test_bundled_slugs_are_unique() {
        let catalog = SeedCatalog::bundled().unwrap();
        let slugs: HashSet<_> = catalog.products.iter().map(|p| &p.product.slug).collect();
        assert_eq!(slugs.len(), catalog.products.len());
    }

    #[test]
    fn test_featured_is_subset() {
        let catalog = SeedCatalog::bundled().unwrap();
        let featured = catalog.featured_products();
        assert!(!featured.is_empty());
        assert!(featured.iter().all(|p| p.is_featured));
        assert!(featured.len() <= catalog.products.len());
    }
}
