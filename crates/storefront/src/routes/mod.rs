//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (Data Store ping)
//!
//! # JSON API
//! GET  /api/products            - All products
//! GET  /api/products/{slug}     - Product with feature lines
//! GET  /api/featured-products   - Featured products
//! GET  /api/testimonials        - Testimonials
//! POST /api/contact             - Contact form
//! POST /api/newsletter          - Newsletter subscription
//!
//! # Client bundle
//! GET  /*                       - Static files from `STOREFRONT_PUBLIC_DIR`,
//!                                 falling back to `index.html`
//! ```

pub mod contact;
pub mod health;
pub mod newsletter;
pub mod products;
pub mod testimonials;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{Request, Response},
    middleware::from_fn,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    api_headers_middleware, request_id_middleware, slow_request_middleware,
};
use crate::models::ValidationError;
use crate::state::AppState;

const MALFORMED_BODY_MESSAGE: &str = "Request body must be a JSON object";

/// Body of form submission responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
}

impl SubmissionResponse {
    /// A successful submission.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Unwrap a JSON form body, turning any rejection into a validation error.
fn form_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(form)| form).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Malformed form body");
        AppError::from(ValidationError::single(MALFORMED_BODY_MESSAGE))
    })
}

/// Unknown `/api` paths answer with the API's JSON error shape.
async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Create the JSON API router (mounted at `/api`).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/featured-products", get(products::featured))
        .route("/testimonials", get(testimonials::index))
        .route("/contact", post(contact::submit))
        .route("/newsletter", post(newsletter::subscribe))
        .fallback(api_not_found)
        .layer(from_fn(api_headers_middleware))
        .layer(from_fn(slow_request_middleware))
}

/// Build the full application router.
///
/// Sentry layers are added by the binary so that tests can drive this
/// router without a Sentry client.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes());

    if let Some(dir) = &state.config().public_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
