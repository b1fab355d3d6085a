//! Import a catalog into `PostgreSQL`.
//!
//! The import is idempotent: products whose slug already exists and
//! testimonials whose ID already exists are left untouched.

use std::path::Path;

use tracing::info;

use crumb_haven_storefront::config::StorefrontConfig;
use crumb_haven_storefront::db::{self, ImportSummary, PgStore};
use crumb_haven_storefront::models::SeedCatalog;

use super::{CliError, database_url};

/// Seed the database from `file`, or from the bundled catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or parsed, or if the
/// import transaction fails.
pub async fn run(file: Option<&Path>) -> Result<ImportSummary, CliError> {
    let catalog = load_catalog(file).await?;
    info!(
        products = catalog.products.len(),
        testimonials = catalog.testimonials.len(),
        "Catalog loaded"
    );

    let config = StorefrontConfig::from_env()?;
    let url = database_url(&config)?;
    let store = PgStore::new(db::create_pool(&url).await?);

    let summary = store.import_catalog(&catalog).await?;
    info!(
        products = summary.products,
        features = summary.features,
        testimonials = summary.testimonials,
        "Seed complete"
    );
    Ok(summary)
}

async fn load_catalog(file: Option<&Path>) -> Result<SeedCatalog, CliError> {
    let Some(path) = file else {
        return Ok(SeedCatalog::bundled()?);
    };

    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(SeedCatalog::from_json(&json)?)
}
