//! Crumb Haven Storefront library.
//!
//! The JSON API behind the Crumb Haven catalog site: cached catalog reads
//! with a static snapshot fallback, and contact/newsletter form writes.
//! Exposed as a library so the binary, the CLI and the integration tests
//! share one router and one Data Store abstraction.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod snapshot;
pub mod state;
