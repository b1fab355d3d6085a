//! In-memory Data Store backed by a [`SeedCatalog`].
//!
//! Used when no database is configured, and by tests: the store can be
//! switched to "unavailable" to simulate an outage, and it counts calls so
//! tests can assert how often the cache actually reached the store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use async_trait::async_trait;

use crumb_haven_core::{
    ContactSubmissionId, NewsletterSubscriptionId, ProductFeatureId, ProductId, Slug,
};

use super::{DataStore, StoreError};
use crate::models::{
    ContactSubmission, NewContactSubmission, NewNewsletterSubscription, NewsletterSubscription,
    Product, ProductFeature, SeedCatalog, Testimonial,
};

/// In-process Data Store.
#[derive(Debug)]
pub struct MemoryStore {
    catalog: RwLock<SeedCatalog>,
    contacts: Mutex<Vec<ContactSubmission>>,
    subscriptions: Mutex<Vec<NewsletterSubscription>>,
    available: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create a store holding the given catalog.
    #[must_use]
    pub fn new(catalog: SeedCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            contacts: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Create a store holding the bundled catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog fails to parse.
    pub fn seeded() -> Result<Self, serde_json::Error> {
        Ok(Self::new(SeedCatalog::bundled()?))
    }

    /// Create a store with no products or testimonials.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(SeedCatalog::default())
    }

    /// Simulate the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Replace the catalog contents.
    pub fn replace_catalog(&self, catalog: SeedCatalog) {
        *self
            .catalog
            .write()
            .unwrap_or_else(PoisonError::into_inner) = catalog;
    }

    /// Number of read calls received, including failed ones.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls received, including failed ones.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Contact submissions persisted so far.
    #[must_use]
    pub fn contact_submissions(&self) -> Vec<ContactSubmission> {
        lock(&self.contacts).clone()
    }

    /// Newsletter subscriptions persisted so far.
    #[must_use]
    pub fn newsletter_subscriptions(&self) -> Vec<NewsletterSubscription> {
        lock(&self.subscriptions).clone()
    }

    fn begin_read(&self) -> Result<RwLockReadGuard<'_, SeedCatalog>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "in-memory store is marked unavailable".to_string(),
            ))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn next_id(len: usize) -> i32 {
    to_i32(len).saturating_add(1)
}

fn sorted_by_id(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by_key(|p| p.id.as_i32());
    products
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        let catalog = self.begin_read()?;
        Ok(sorted_by_id(catalog.product_list()))
    }

    async fn featured_products(&self) -> Result<Vec<Product>, StoreError> {
        let catalog = self.begin_read()?;
        Ok(sorted_by_id(catalog.featured_products()))
    }

    async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, StoreError> {
        let catalog = self.begin_read()?;
        Ok(catalog
            .products
            .iter()
            .find(|p| &p.product.slug == slug)
            .map(|p| p.product.clone()))
    }

    async fn product_features(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductFeature>, StoreError> {
        let catalog = self.begin_read()?;

        // Feature IDs are assigned sequentially across the catalog.
        let mut first_id = 1;
        for seed in &catalog.products {
            if seed.product.id == product_id {
                return Ok(seed
                    .features
                    .iter()
                    .zip(0..)
                    .map(|(feature, position)| ProductFeature {
                        id: ProductFeatureId::new(first_id + position),
                        product_id,
                        feature: feature.clone(),
                        position,
                    })
                    .collect());
            }
            first_id = first_id.saturating_add(to_i32(seed.features.len()));
        }

        Ok(Vec::new())
    }

    async fn testimonials(&self) -> Result<Vec<Testimonial>, StoreError> {
        let catalog = self.begin_read()?;
        let mut testimonials = catalog.testimonials.clone();
        testimonials.sort_by_key(|t| t.id.as_i32());
        Ok(testimonials)
    }

    async fn create_contact_submission(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        self.begin_write()?;
        let mut contacts = lock(&self.contacts);
        let stored = ContactSubmission {
            id: ContactSubmissionId::new(next_id(contacts.len())),
            name: submission.name,
            email: submission.email,
            subject: submission.subject,
            message: submission.message,
            created_at: submission.created_at,
        };
        contacts.push(stored.clone());
        Ok(stored)
    }

    async fn create_newsletter_subscription(
        &self,
        subscription: NewNewsletterSubscription,
    ) -> Result<NewsletterSubscription, StoreError> {
        self.begin_write()?;
        let mut subscriptions = lock(&self.subscriptions);
        if subscriptions.iter().any(|s| s.email == subscription.email) {
            return Err(StoreError::Conflict(format!(
                "{} is already subscribed",
                subscription.email
            )));
        }
        let stored = NewsletterSubscription {
            id: NewsletterSubscriptionId::new(next_id(subscriptions.len())),
            email: subscription.email,
            created_at: subscription.created_at,
        };
        subscriptions.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use crumb_haven_core::Email;

    use super::*;

    fn slug(s: &str) -> Slug {
        Slug::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_store_serves_catalog() {
        let store = MemoryStore::seeded().unwrap();
        let products = store.products().await.unwrap();
        assert_eq!(products.len(), 4);

        let featured = store.featured_products().await.unwrap();
        assert!(featured.iter().all(|p| p.is_featured));

        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_product_by_slug_and_features() {
        let store = MemoryStore::seeded().unwrap();
        let product = store
            .product_by_slug(&slug("kodo-millet"))
            .await
            .unwrap()
            .unwrap();
        let features = store.product_features(product.id).await.unwrap();
        assert_eq!(
            features.first().map(|f| f.feature.as_str()),
            Some("100% kodo millet flour")
        );
        assert!(features.windows(2).all(|w| w[0].position < w[1].position));

        assert!(
            store
                .product_by_slug(&slug("does-not-exist"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_feature_ids_are_unique_across_products() {
        let store = MemoryStore::seeded().unwrap();
        let mut ids = Vec::new();
        for product in store.products().await.unwrap() {
            ids.extend(
                store
                    .product_features(product.id)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|f| f.id),
            );
        }
        let total = ids.len();
        ids.sort_by_key(ProductFeatureId::as_i32);
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_reads_and_writes() {
        let store = MemoryStore::seeded().unwrap();
        store.set_available(false);

        assert!(matches!(
            store.products().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.ping().await.is_err());

        let result = store
            .create_newsletter_subscription(NewNewsletterSubscription {
                email: Email::parse("a@b.com").unwrap(),
                created_at: Utc::now(),
            })
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.write_count(), 1);
        assert!(store.newsletter_subscriptions().is_empty());

        store.set_available(true);
        assert!(store.products().await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_subscription_conflicts() {
        let store = MemoryStore::empty();
        let new = || NewNewsletterSubscription {
            email: Email::parse("a@b.com").unwrap(),
            created_at: Utc::now(),
        };

        let first = store.create_newsletter_subscription(new()).await.unwrap();
        assert_eq!(first.id.as_i32(), 1);

        assert!(matches!(
            store.create_newsletter_subscription(new()).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.newsletter_subscriptions().len(), 1);
    }
}
