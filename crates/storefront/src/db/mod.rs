//! Data Store: persistence for catalog reads and form writes.
//!
//! # Implementations
//!
//! - [`PgStore`] - `PostgreSQL` (schema `storefront`)
//! - [`MemoryStore`] - in-process store seeded from the bundled catalog,
//!   used when no database is configured and throughout the tests
//!
//! ## Tables
//!
//! - `product` - Catalog products (unique `slug`)
//! - `product_feature` - Ordered feature lines per product
//! - `testimonial` - Customer testimonials
//! - `contact_submission` - Contact form submissions (write-once)
//! - `newsletter_subscription` - Newsletter sign-ups (unique `email`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p crumb-haven-cli -- migrate
//! ```

mod memory;
mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crumb_haven_core::{ProductId, Slug};

use crate::models::{
    ContactSubmission, NewContactSubmission, NewNewsletterSubscription, NewsletterSubscription,
    Product, ProductFeature, Testimonial,
};

pub use memory::MemoryStore;
pub use postgres::{ImportSummary, PgStore};

/// Errors that can occur during Data Store operations.
///
/// `NotFound` is kept distinct from transport failures so that callers can
/// answer 404 for a legitimately absent entity.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate newsletter email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Whether this error reports an absent entity rather than a failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Persistence operations the storefront depends on.
///
/// Reads feed the read-through cache; writes are never cached.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// All products, ordered by ID.
    async fn products(&self) -> Result<Vec<Product>, StoreError>;

    /// Featured products, ordered by ID.
    async fn featured_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Look up a product by slug. `Ok(None)` when no such product exists.
    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, StoreError>;

    /// Feature lines of a product, ordered by position.
    async fn product_features(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductFeature>, StoreError>;

    /// All testimonials, ordered by ID.
    async fn testimonials(&self) -> Result<Vec<Testimonial>, StoreError>;

    /// Persist a contact submission.
    async fn create_contact_submission(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError>;

    /// Persist a newsletter subscription.
    ///
    /// Returns `StoreError::Conflict` if the email is already subscribed.
    async fn create_newsletter_subscription(
        &self,
        subscription: NewNewsletterSubscription,
    ) -> Result<NewsletterSubscription, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguished() {
        assert!(StoreError::NotFound.is_not_found());
        assert!(!StoreError::Unavailable("down".to_string()).is_not_found());
        assert!(!StoreError::DataCorruption("bad row".to_string()).is_not_found());
    }
}
