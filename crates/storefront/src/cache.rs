//! Read-through TTL cache for catalog reads.
//!
//! One entry per named [`CacheSlot`] plus one entry per product slug. Each
//! entry records when it was captured and the TTL it was stored with; it is
//! fresh while `now - captured_at < ttl`. A stale or missing entry is
//! replaced by calling the loader once; there is no background refresh.
//!
//! Entries live in an unbounded `moka` map with no eviction or built-in
//! expiry: freshness is decided here, per call, against tokio's clock. The
//! per-slug map therefore grows with the number of distinct slugs requested.
//! That is acceptable for a small static catalog but is a scaling limit.
//!
//! Concurrent misses are not deduplicated: several requests observing the
//! same stale entry may each call their loader, and the last insert wins.
//! Entries are replaced whole, never mutated in place.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::time::Instant;
use tracing::{debug, warn};

use crumb_haven_core::Slug;

use crate::models::{Product, ProductDetails, Testimonial};

/// Named cache slots holding whole collections.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheSlot {
    Products,
    FeaturedProducts,
    Testimonials,
}

impl CacheSlot {
    /// Slot name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::FeaturedProducts => "featuredProducts",
            Self::Testimonials => "testimonials",
        }
    }
}

/// Cache key for slots and product details.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Slot(CacheSlot),
    ProductDetails(Slug),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Testimonials(Arc<Vec<Testimonial>>),
    ProductDetails(Arc<ProductDetails>),
}

/// A payload type that can be stored in the cache.
///
/// Maps a concrete payload to and from its [`CacheValue`] variant so that a
/// slot holding the wrong kind of value is detected rather than misread.
pub trait CachePayload: Sized {
    /// Wrap a shared payload in its cache variant.
    fn into_value(data: Arc<Self>) -> CacheValue;

    /// Extract a shared payload if the variant matches.
    fn from_value(value: &CacheValue) -> Option<Arc<Self>>;
}

impl CachePayload for Vec<Product> {
    fn into_value(data: Arc<Self>) -> CacheValue {
        CacheValue::Products(data)
    }

    fn from_value(value: &CacheValue) -> Option<Arc<Self>> {
        match value {
            CacheValue::Products(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl CachePayload for Vec<Testimonial> {
    fn into_value(data: Arc<Self>) -> CacheValue {
        CacheValue::Testimonials(data)
    }

    fn from_value(value: &CacheValue) -> Option<Arc<Self>> {
        match value {
            CacheValue::Testimonials(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl CachePayload for ProductDetails {
    fn into_value(data: Arc<Self>) -> CacheValue {
        CacheValue::ProductDetails(data)
    }

    fn from_value(value: &CacheValue) -> Option<Arc<Self>> {
        match value {
            CacheValue::ProductDetails(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

/// A cached value with the time it was captured and its TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: CacheValue,
    captured_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Whether the entry is still fresh at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.captured_at) < self.ttl
    }
}

/// Read-through cache shared by all requests.
///
/// Cheaply cloneable; clones share the same entries.
#[derive(Clone)]
pub struct ReadThroughCache {
    entries: Cache<CacheKey, CacheEntry>,
}

impl Default for ReadThroughCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadThroughCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Return the fresh value for `slot`, or call `loader`, store its result
    /// with the given `ttl`, and return that.
    ///
    /// # Errors
    ///
    /// Returns the loader's error unchanged. Failed loads are not cached.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        slot: CacheSlot,
        ttl: Duration,
        loader: F,
    ) -> Result<Arc<T>, E>
    where
        T: CachePayload,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.read_through(CacheKey::Slot(slot), ttl, loader).await
    }

    /// Same contract as [`get_or_fetch`](Self::get_or_fetch), keyed by
    /// product slug. Each slug keeps its own TTL clock.
    ///
    /// # Errors
    ///
    /// Returns the loader's error unchanged. Failed loads are not cached.
    pub async fn get_product_details<E, F, Fut>(
        &self,
        slug: &Slug,
        ttl: Duration,
        loader: F,
    ) -> Result<Arc<ProductDetails>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProductDetails, E>>,
    {
        self.read_through(CacheKey::ProductDetails(slug.clone()), ttl, loader)
            .await
    }

    async fn read_through<T, E, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        loader: F,
    ) -> Result<Arc<T>, E>
    where
        T: CachePayload,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.entries.get(&key).await
            && entry.is_fresh(Instant::now())
        {
            if let Some(data) = T::from_value(&entry.value) {
                debug!(key = ?key, "Cache hit");
                return Ok(data);
            }
            warn!(key = ?key, "Cache entry holds an unexpected payload, reloading");
        }

        debug!(key = ?key, "Cache miss");
        let data = Arc::new(loader().await?);
        let entry = CacheEntry {
            value: T::into_value(Arc::clone(&data)),
            captured_at: Instant::now(),
            ttl,
        };
        self.entries.insert(key, entry).await;
        Ok(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crumb_haven_core::TestimonialId;

    use super::*;
    use crate::models::{SeedCatalog, SeedProduct};

    const TTL: Duration = Duration::from_secs(300);

    fn testimonials(n: usize) -> Vec<Testimonial> {
        (1..=i32::try_from(n).unwrap())
            .map(|id| Testimonial {
                id: TestimonialId::new(id),
                name: format!("Customer {id}"),
                location: None,
                rating: 5,
                content: "Lovely".to_string(),
            })
            .collect()
    }

    fn details(slug: &str) -> ProductDetails {
        SeedCatalog::bundled()
            .unwrap()
            .products
            .iter()
            .find(|p| p.product.slug.as_str() == slug)
            .map(SeedProduct::details)
            .unwrap()
    }

    /// Returns as many testimonials as calls made so far, so each reload is
    /// distinguishable from the last.
    async fn load_counting(calls: &AtomicUsize) -> Result<Vec<Testimonial>, Infallible> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(testimonials(n))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_skips_loader() {
        let cache = ReadThroughCache::new();
        let calls = &AtomicUsize::new(0);

        let first = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, || load_counting(calls))
            .await
            .unwrap();

        tokio::time::advance(TTL - Duration::from_millis(1)).await;

        let second = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, || load_counting(calls))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_reloads_exactly_once() {
        let cache = ReadThroughCache::new();
        let calls = &AtomicUsize::new(0);

        cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, || load_counting(calls))
            .await
            .unwrap();

        // Elapsed == TTL is already stale.
        tokio::time::advance(TTL).await;

        let reloaded = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, || load_counting(calls))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(reloaded.len(), 2);

        // The reloaded entry is fresh again.
        let again = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, || load_counting(calls))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(Arc::ptr_eq(&reloaded, &again));
    }

    #[tokio::test(start_paused = true)]
    async fn test_freshness_boundary_across_ttls() {
        for ttl_secs in [1_u64, 60, 1800] {
            let ttl = Duration::from_secs(ttl_secs);
            for (elapsed, expect_reload) in [
                (Duration::ZERO, false),
                (ttl - Duration::from_millis(1), false),
                (ttl, true),
                (ttl + Duration::from_secs(1), true),
            ] {
                let cache = ReadThroughCache::new();
                let calls = &AtomicUsize::new(0);

                cache
                    .get_or_fetch(CacheSlot::Testimonials, ttl, || load_counting(calls))
                    .await
                    .unwrap();
                tokio::time::advance(elapsed).await;
                cache
                    .get_or_fetch(CacheSlot::Testimonials, ttl, || load_counting(calls))
                    .await
                    .unwrap();

                let expected = if expect_reload { 2 } else { 1 };
                assert_eq!(
                    calls.load(Ordering::SeqCst),
                    expected,
                    "ttl={ttl:?} elapsed={elapsed:?}"
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slots_are_independent() {
        let cache = ReadThroughCache::new();
        let testimonial_calls = &AtomicUsize::new(0);
        let product_calls = &AtomicUsize::new(0);
        let catalog = &SeedCatalog::bundled().unwrap();
        let short = Duration::from_secs(60);
        let long = Duration::from_secs(600);

        let load_products = move || async move {
            product_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(catalog.product_list())
        };

        cache
            .get_or_fetch(CacheSlot::Products, long, load_products)
            .await
            .unwrap();
        cache
            .get_or_fetch(CacheSlot::Testimonials, short, || {
                load_counting(testimonial_calls)
            })
            .await
            .unwrap();

        // Testimonials expire, products do not.
        tokio::time::advance(Duration::from_secs(120)).await;

        cache
            .get_or_fetch(CacheSlot::Testimonials, short, || {
                load_counting(testimonial_calls)
            })
            .await
            .unwrap();
        cache
            .get_or_fetch(CacheSlot::Products, long, load_products)
            .await
            .unwrap();

        assert_eq!(testimonial_calls.load(Ordering::SeqCst), 2);
        assert_eq!(product_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_products_and_featured_do_not_share_entries() {
        let cache = ReadThroughCache::new();
        let catalog = &SeedCatalog::bundled().unwrap();

        let all = cache
            .get_or_fetch(CacheSlot::Products, TTL, move || async move {
                Ok::<_, Infallible>(catalog.product_list())
            })
            .await
            .unwrap();
        let featured = cache
            .get_or_fetch(CacheSlot::FeaturedProducts, TTL, move || async move {
                Ok::<_, Infallible>(catalog.featured_products())
            })
            .await
            .unwrap();

        assert_eq!(all.len(), catalog.products.len());
        assert!(featured.iter().all(|p| p.is_featured));
        assert!(!Arc::ptr_eq(&all, &featured));
    }

    #[tokio::test(start_paused = true)]
    async fn test_product_details_keep_independent_clocks() {
        let cache = ReadThroughCache::new();
        let almond_calls = &AtomicUsize::new(0);
        let kodo_calls = &AtomicUsize::new(0);
        let almond = Slug::parse("almond-oat").unwrap();
        let kodo = Slug::parse("kodo-millet").unwrap();
        let ttl = Duration::from_secs(600);

        let load = |slug: &str, counter: &AtomicUsize| {
            counter.fetch_add(1, Ordering::SeqCst);
            let data = details(slug);
            async move { Ok::<_, Infallible>(data) }
        };

        cache
            .get_product_details(&almond, ttl, || load("almond-oat", almond_calls))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;

        cache
            .get_product_details(&kodo, ttl, || load("kodo-millet", kodo_calls))
            .await
            .unwrap();

        // almond-oat is now 700s old (stale); kodo-millet is 300s old (fresh).
        tokio::time::advance(Duration::from_secs(300)).await;

        let almond_details = cache
            .get_product_details(&almond, ttl, || load("almond-oat", almond_calls))
            .await
            .unwrap();
        let kodo_details = cache
            .get_product_details(&kodo, ttl, || load("kodo-millet", kodo_calls))
            .await
            .unwrap();

        assert_eq!(almond_calls.load(Ordering::SeqCst), 2);
        assert_eq!(kodo_calls.load(Ordering::SeqCst), 1);
        assert_eq!(almond_details.product.slug, almond);
        assert_eq!(kodo_details.product.slug, kodo);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_is_not_cached() {
        let cache = ReadThroughCache::new();
        let calls = &AtomicUsize::new(0);

        let failed: Result<Arc<Vec<Testimonial>>, &str> = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("store down")
            })
            .await;
        assert_eq!(failed.unwrap_err(), "store down");

        let recovered = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(testimonials(3))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(recovered.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatched_payload_is_reloaded() {
        let cache = ReadThroughCache::new();
        let catalog = &SeedCatalog::bundled().unwrap();

        cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, || async {
                Ok::<_, Infallible>(testimonials(2))
            })
            .await
            .unwrap();

        // Reading the same slot as a product list must not misinterpret it.
        let products = cache
            .get_or_fetch(CacheSlot::Testimonials, TTL, move || async move {
                Ok::<_, Infallible>(catalog.product_list())
            })
            .await
            .unwrap();
        assert_eq!(products.len(), catalog.products.len());
    }

    #[test]
    fn test_entry_freshness() {
        let now = Instant::from_std(std::time::Instant::now());
        let entry = CacheEntry {
            value: CacheValue::Testimonials(Arc::new(Vec::new())),
            captured_at: now,
            ttl: Duration::from_secs(10),
        };
        assert!(entry.is_fresh(now));
        assert!(entry.is_fresh(now + Duration::from_secs(9)));
        assert!(!entry.is_fresh(now + Duration::from_secs(10)));
    }
}
