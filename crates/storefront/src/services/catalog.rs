//! Catalog reads: cache, then Data Store, then static snapshot.
//!
//! A fresh cache entry answers without touching the store. On a miss the
//! store is queried and a successful, non-empty result is cached. When the
//! store fails or returns an empty collection the matching snapshot file is
//! read instead; snapshot results are never cached, so the store is retried
//! on the next request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crumb_haven_core::Slug;

use crate::cache::{CachePayload, CacheSlot, ReadThroughCache};
use crate::config::CacheTtls;
use crate::db::{DataStore, StoreError};
use crate::models::{Product, ProductDetails, Testimonial};
use crate::snapshot::{SnapshotError, SnapshotReader, SnapshotResource};

/// Errors returned by catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The store has no such product and no snapshot covers it.
    #[error("product not found: {slug}")]
    NotFound { slug: Slug },

    /// Both the store and the snapshot failed.
    #[error("{resource} unavailable: store failed ({store}), snapshot failed ({snapshot})")]
    Unavailable {
        resource: String,
        #[source]
        store: StoreError,
        snapshot: SnapshotError,
    },
}

/// Catalog read service shared by all requests.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DataStore>,
    cache: ReadThroughCache,
    snapshots: SnapshotReader,
    ttls: CacheTtls,
}

impl Catalog {
    /// Create a catalog with an empty cache.
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, snapshots: SnapshotReader, ttls: CacheTtls) -> Self {
        Self {
            store,
            cache: ReadThroughCache::new(),
            snapshots,
            ttls,
        }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` if the store and the snapshot
    /// both fail.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        self.read_slot(
            CacheSlot::Products,
            self.ttls.products,
            self.store.products(),
        )
        .await
    }

    /// Featured products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` if the store and the snapshot
    /// both fail.
    pub async fn featured_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        self.read_slot(
            CacheSlot::FeaturedProducts,
            self.ttls.featured_products,
            self.store.featured_products(),
        )
        .await
    }

    /// All testimonials.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` if the store and the snapshot
    /// both fail.
    pub async fn testimonials(&self) -> Result<Arc<Vec<Testimonial>>, CatalogError> {
        self.read_slot(
            CacheSlot::Testimonials,
            self.ttls.testimonials,
            self.store.testimonials(),
        )
        .await
    }

    /// A product with its ordered feature lines.
    ///
    /// A product the store does not know is still looked up in the
    /// snapshots before being reported missing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the store reports the product
    /// absent and no usable snapshot exists, or `CatalogError::Unavailable`
    /// if the store failed for any other reason and the snapshot failed too.
    pub async fn product_details(&self, slug: &Slug) -> Result<Arc<ProductDetails>, CatalogError> {
        let store_err = match self
            .cache
            .get_product_details(slug, self.ttls.product_detail, || {
                self.load_product_details(slug)
            })
            .await
        {
            Ok(details) => return Ok(details),
            Err(e) => e,
        };

        let resource = SnapshotResource::Product(slug);
        if store_err.is_not_found() {
            debug!(
                operation = "product_details",
                slug = %slug,
                "Product not in store, checking snapshot"
            );
        } else {
            warn!(
                operation = "product_details",
                slug = %slug,
                error = %store_err,
                "Data Store read failed, falling back to snapshot"
            );
        }

        match self.snapshots.product_details(slug).await {
            Ok(details) => {
                info!(operation = "product_details", slug = %slug, "Served from snapshot");
                Ok(Arc::new(details))
            }
            Err(snapshot_err) if store_err.is_not_found() => {
                debug!(
                    operation = "product_details",
                    slug = %slug,
                    error = %snapshot_err,
                    "No snapshot for missing product"
                );
                Err(CatalogError::NotFound { slug: slug.clone() })
            }
            Err(snapshot_err) => {
                warn!(
                    operation = "product_details",
                    slug = %slug,
                    error = %snapshot_err,
                    "Snapshot fallback failed"
                );
                Err(CatalogError::Unavailable {
                    resource: resource.to_string(),
                    store: store_err,
                    snapshot: snapshot_err,
                })
            }
        }
    }

    async fn load_product_details(&self, slug: &Slug) -> Result<ProductDetails, StoreError> {
        let product = self
            .store
            .product_by_slug(slug)
            .await?
            .ok_or(StoreError::NotFound)?;
        let features = self.store.product_features(product.id).await?;
        Ok(ProductDetails::new(product, features))
    }

    async fn read_slot<I, Fut>(
        &self,
        slot: CacheSlot,
        ttl: Duration,
        load: Fut,
    ) -> Result<Arc<Vec<I>>, CatalogError>
    where
        Vec<I>: CachePayload + DeserializeOwned,
        Fut: Future<Output = Result<Vec<I>, StoreError>>,
    {
        // An empty collection is a miss: it is not cached and the snapshot
        // gets a chance to answer.
        let loader = || async move {
            let items = load.await?;
            if items.is_empty() {
                Err(StoreError::NotFound)
            } else {
                Ok(items)
            }
        };

        let store_err = match self.cache.get_or_fetch(slot, ttl, loader).await {
            Ok(data) => return Ok(data),
            Err(e) => e,
        };

        if store_err.is_not_found() {
            debug!(operation = slot.name(), "Data Store returned nothing, checking snapshot");
        } else {
            warn!(
                operation = slot.name(),
                error = %store_err,
                "Data Store read failed, falling back to snapshot"
            );
        }

        let resource = snapshot_resource(slot);
        match self.snapshots.read::<Vec<I>>(resource).await {
            Ok(data) => {
                info!(operation = slot.name(), "Served from snapshot");
                Ok(Arc::new(data))
            }
            Err(snapshot_err) if store_err.is_not_found() => {
                debug!(
                    operation = slot.name(),
                    error = %snapshot_err,
                    "No snapshot for empty collection"
                );
                Ok(Arc::new(Vec::new()))
            }
            Err(snapshot_err) => {
                warn!(
                    operation = slot.name(),
                    error = %snapshot_err,
                    "Snapshot fallback failed"
                );
                Err(CatalogError::Unavailable {
                    resource: resource.to_string(),
                    store: store_err,
                    snapshot: snapshot_err,
                })
            }
        }
    }
}

const fn snapshot_resource(slot: CacheSlot) -> SnapshotResource<'static> {
    match slot {
        CacheSlot::Products => SnapshotResource::Products,
        CacheSlot::FeaturedProducts => SnapshotResource::FeaturedProducts,
        CacheSlot::Testimonials => SnapshotResource::Testimonials,
    }
}
