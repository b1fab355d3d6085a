//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Cached catalog reads with snapshot fallback

pub mod catalog;

pub use catalog::{Catalog, CatalogError};
