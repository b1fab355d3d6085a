//! Snapshot export.
//!
//! Writes every file the storefront's static fallback reads: the three
//! list snapshots plus one detail document per product.

use std::path::{Path, PathBuf};

use tracing::info;

use crumb_haven_storefront::config::StorefrontConfig;
use crumb_haven_storefront::db::{self, DataStore, MemoryStore, PgStore};
use crumb_haven_storefront::models::ProductDetails;
use crumb_haven_storefront::snapshot::{SnapshotResource, SnapshotWriter};

use super::{CliError, database_url};

/// Counts of files written by an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub products: usize,
    pub featured_products: usize,
    pub testimonials: usize,
    pub detail_files: usize,
}

/// Export snapshots into `dir` (or the configured snapshot directory).
///
/// # Errors
///
/// Returns an error if the source cannot be read or a file cannot be written.
pub async fn export(dir: Option<PathBuf>, from_seed: bool) -> Result<ExportSummary, CliError> {
    let config = StorefrontConfig::from_env()?;
    let dir = dir.unwrap_or_else(|| config.snapshot_dir.clone());

    let summary = if from_seed {
        info!("Exporting bundled catalog");
        write_all(&MemoryStore::seeded()?, &dir).await?
    } else {
        let url = database_url(&config)?;
        let store = PgStore::new(db::create_pool(&url).await?);
        info!("Exporting from database");
        write_all(&store, &dir).await?
    };

    info!(
        dir = %dir.display(),
        products = summary.products,
        featured_products = summary.featured_products,
        testimonials = summary.testimonials,
        detail_files = summary.detail_files,
        "Snapshot export complete"
    );
    Ok(summary)
}

async fn write_all(store: &dyn DataStore, dir: &Path) -> Result<ExportSummary, CliError> {
    let writer = SnapshotWriter::new(dir);

    let products = store.products().await?;
    writer.write(SnapshotResource::Products, &products).await?;

    let featured = store.featured_products().await?;
    writer
        .write(SnapshotResource::FeaturedProducts, &featured)
        .await?;

    let testimonials = store.testimonials().await?;
    writer
        .write(SnapshotResource::Testimonials, &testimonials)
        .await?;

    let mut detail_files = 0;
    for product in &products {
        let features = store.product_features(product.id).await?;
        let details = ProductDetails::new(product.clone(), features);
        writer
            .write(SnapshotResource::Product(&product.slug), &details)
            .await?;
        detail_files += 1;
    }

    Ok(ExportSummary {
        products: products.len(),
        featured_products: featured.len(),
        testimonials: testimonials.len(),
        detail_files,
    })
}
