//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod snapshot;

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use crumb_haven_storefront::config::{ConfigError, StorefrontConfig};
use crumb_haven_storefront::db::StoreError;
use crumb_haven_storefront::snapshot::SnapshotError;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Data Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// The configured database URL, which every database command requires.
fn database_url(config: &StorefrontConfig) -> Result<SecretString, CliError> {
    config
        .database_url
        .clone()
        .ok_or(CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}
