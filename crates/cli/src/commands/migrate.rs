//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! crumb-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`

use tracing::info;

use crumb_haven_storefront::config::StorefrontConfig;
use crumb_haven_storefront::db;

use super::{CliError, database_url};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let url = database_url(&config)?;

    info!("Connecting to storefront database...");
    let pool = db::create_pool(&url).await?;

    info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Storefront migrations complete");
    Ok(())
}
