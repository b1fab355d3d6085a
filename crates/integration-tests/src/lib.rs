//! Integration tests for Crumb Haven.
//!
//! The storefront router is driven in-process with
//! `tower::ServiceExt::oneshot`; no server or database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p crumb-haven-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - Catalog reads, fallback, forms and headers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crumb_haven_storefront::config::StorefrontConfig;
use crumb_haven_storefront::db::{DataStore, MemoryStore};
use crumb_haven_storefront::routes;
use crumb_haven_storefront::state::AppState;

/// Snapshot files shipped with the storefront crate.
#[must_use]
pub fn bundled_snapshot_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../storefront/snapshots")
}

/// A response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    /// A header value as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An in-process storefront backed by an in-memory store.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    /// Build an app over `store`, reading snapshots from `snapshot_dir`.
    #[must_use]
    pub fn new(store: MemoryStore, snapshot_dir: impl Into<PathBuf>) -> Self {
        let store = Arc::new(store);
        let config = StorefrontConfig {
            snapshot_dir: snapshot_dir.into(),
            ..StorefrontConfig::default()
        };
        let state = AppState::new(config, Arc::clone(&store) as Arc<dyn DataStore>);
        Self {
            store,
            router: routes::router(state),
        }
    }

    /// The bundled catalog with the bundled snapshots.
    ///
    /// # Panics
    ///
    /// Panics if the bundled catalog fails to parse.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(
            MemoryStore::seeded().expect("Bundled catalog must parse"),
            bundled_snapshot_dir(),
        )
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// Send a POST request with a raw JSON body.
    pub async fn post_json(&self, uri: &str, body: &str) -> TestResponse {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, Body::from))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
