//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::DataStore;
use crate::services::Catalog;
use crate::snapshot::SnapshotReader;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and owns the Data Store and
/// the catalog (and therefore its read-through cache) for the lifetime of
/// the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn DataStore>,
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state with an empty cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Data Store backing reads and form writes
    #[must_use]
    pub fn new(config: StorefrontConfig, store: Arc<dyn DataStore>) -> Self {
        let catalog = Catalog::new(
            Arc::clone(&store),
            SnapshotReader::new(config.snapshot_dir.clone()),
            config.cache,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Data Store.
    #[must_use]
    pub fn store(&self) -> &dyn DataStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the catalog read service.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
