//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; without either the bundled in-memory catalog is served)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_SNAPSHOT_DIR` - Static fallback snapshots (default:
//!   `crates/storefront/snapshots`)
//! - `STOREFRONT_PUBLIC_DIR` - Client bundle served for non-API paths
//! - `CACHE_TTL_PRODUCTS_SECS` - Product list TTL (default: 300)
//! - `CACHE_TTL_FEATURED_SECS` - Featured products TTL (default: 300)
//! - `CACHE_TTL_TESTIMONIALS_SECS` - Testimonials TTL (default: 1800)
//! - `CACHE_TTL_PRODUCT_DETAIL_SECS` - Per-product detail TTL (default: 600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.0)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for plain text

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SNAPSHOT_DIR: &str = "crates/storefront/snapshots";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// TTL per cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub products: Duration,
    pub featured_products: Duration,
    pub testimonials: Duration,
    pub product_detail: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            products: Duration::from_secs(300),
            featured_products: Duration::from_secs(300),
            testimonials: Duration::from_secs(30 * 60),
            product_detail: Duration::from_secs(10 * 60),
        }
    }
}

impl CacheTtls {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            products: get_secs_or_default("CACHE_TTL_PRODUCTS_SECS", defaults.products)?,
            featured_products: get_secs_or_default(
                "CACHE_TTL_FEATURED_SECS",
                defaults.featured_products,
            )?,
            testimonials: get_secs_or_default(
                "CACHE_TTL_TESTIMONIALS_SECS",
                defaults.testimonials,
            )?,
            product_detail: get_secs_or_default(
                "CACHE_TTL_PRODUCT_DETAIL_SECS",
                defaults.product_detail,
            )?,
        })
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the static fallback snapshots
    pub snapshot_dir: PathBuf,
    /// Directory of the client bundle, if served by this process
    pub public_dir: Option<PathBuf>,
    /// Cache TTLs
    pub cache: CacheTtls,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            public_dir: None,
            cache: CacheTtls::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            log_format: LogFormat::Text,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        Ok(Self {
            database_url: get_database_url("STOREFRONT_DATABASE_URL"),
            host: get_parsed_or_default("STOREFRONT_HOST", defaults.host)?,
            port: get_parsed_or_default("STOREFRONT_PORT", defaults.port)?,
            snapshot_dir: get_optional_env("STOREFRONT_SNAPSHOT_DIR")
                .map_or(defaults.snapshot_dir, PathBuf::from),
            public_dir: get_optional_env("STOREFRONT_PUBLIC_DIR").map(PathBuf::from),
            cache: CacheTtls::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate_or_default(
                "SENTRY_SAMPLE_RATE",
                defaults.sentry_sample_rate,
            )?,
            sentry_traces_sample_rate: get_rate_or_default(
                "SENTRY_TRACES_SAMPLE_RATE",
                defaults.sentry_traces_sample_rate,
            )?,
            log_format: parse_log_format(get_optional_env("LOG_FORMAT").as_deref()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, or use `default` when it is unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| parse_value(key, &value))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_secs_or_default(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_parsed_or_default(key, default.as_secs()).map(Duration::from_secs)
}

fn get_rate_or_default(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate = get_parsed_or_default(key, default)?;
    validate_rate(key, rate)
}

fn validate_rate(key: &str, rate: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

fn parse_log_format(value: Option<&str>) -> LogFormat {
    match value {
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}
