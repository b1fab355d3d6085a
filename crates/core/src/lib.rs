//! Crumb Haven Core - Shared value types.
//!
//! This crate provides the validated value types used across the Crumb Haven
//! components:
//! - `storefront` - JSON API backing the catalog site
//! - `cli` - Migrations, seeding and snapshot export
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Every type validates on construction so that a value held by the rest of
//! the system is known to be well-formed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, slugs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
