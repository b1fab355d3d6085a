//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding; the client only ever sees a
//! generic per-operation message.
//!
//! Read endpoints answer `{"message": "..."}`; form endpoints answer
//! `{"success": false, "message": "..."}`.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::ValidationError;
use crate::services::CatalogError;

/// The API operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListProducts,
    GetProduct,
    FeaturedProducts,
    Testimonials,
    SubmitContact,
    SubscribeNewsletter,
}

impl Operation {
    /// Operation name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListProducts => "list_products",
            Self::GetProduct => "get_product",
            Self::FeaturedProducts => "featured_products",
            Self::Testimonials => "testimonials",
            Self::SubmitContact => "submit_contact",
            Self::SubscribeNewsletter => "subscribe_newsletter",
        }
    }

    /// Message shown to the client when the operation fails server-side.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::ListProducts => "Failed to fetch products",
            Self::GetProduct => "Failed to fetch product",
            Self::FeaturedProducts => "Failed to fetch featured products",
            Self::Testimonials => "Failed to fetch testimonials",
            Self::SubmitContact => "Failed to submit contact form. Please try again.",
            Self::SubscribeNewsletter => "Failed to subscribe to newsletter. Please try again.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Application-level error type for the storefront API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Submitted form failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resource not found. The message is shown to the client.
    #[error("{0}")]
    NotFound(String),

    /// Catalog read failed and no fallback was available.
    #[error("{operation} failed: {source}")]
    Catalog {
        operation: Operation,
        #[source]
        source: CatalogError,
    },

    /// A form submission could not be persisted.
    #[error("{operation} failed: {source}")]
    Submission {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    /// Error returned for an unknown or malformed product slug.
    #[must_use]
    pub fn product_not_found() -> Self {
        Self::NotFound("Product not found".to_string())
    }

    /// Map a catalog failure for `operation`.
    #[must_use]
    pub fn catalog(operation: Operation, source: CatalogError) -> Self {
        match source {
            CatalogError::NotFound { .. } => Self::product_not_found(),
            CatalogError::Unavailable { .. } => Self::Catalog { operation, source },
        }
    }

    /// Map a persistence failure for a form `operation`.
    #[must_use]
    pub const fn submission(operation: Operation, source: StoreError) -> Self {
        Self::Submission { operation, source }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Submission { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Catalog { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Catalog { .. } | Self::Submission { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Validation(err) => json!({ "success": false, "message": err.to_string() }),
            Self::Submission { operation, .. } => {
                json!({ "success": false, "message": operation.failure_message() })
            }
            Self::NotFound(message) => json!({ "message": message }),
            Self::Catalog { operation, .. } => json!({ "message": operation.failure_message() }),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use serde_json::Value;

    use super::*;
    use crate::snapshot::SnapshotError;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn unavailable() -> CatalogError {
        CatalogError::Unavailable {
            resource: "products".to_string(),
            store: StoreError::Unavailable("connection refused".to_string()),
            snapshot: SnapshotError::NotFound {
                path: PathBuf::from("/srv/snapshots/products.json"),
            },
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::from(ValidationError::single("Name is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::product_not_found().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::catalog(Operation::ListProducts, unavailable()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::submission(
                Operation::SubmitContact,
                StoreError::Unavailable("down".to_string())
            )
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_catalog_not_found_maps_to_not_found() {
        let err = AppError::catalog(
            Operation::GetProduct,
            CatalogError::NotFound {
                slug: crumb_haven_core::Slug::parse("does-not-exist").unwrap(),
            },
        );
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_catalog_failure_hides_details() {
        let (status, body) =
            body_json(AppError::catalog(Operation::ListProducts, unavailable())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Failed to fetch products" }));
    }

    #[tokio::test]
    async fn test_validation_body() {
        let (status, body) = body_json(AppError::from(ValidationError::single(
            "Please enter a valid email address",
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "Validation error: Please enter a valid email address"
        );
    }

    #[tokio::test]
    async fn test_submission_failure_body() {
        let (status, body) = body_json(AppError::submission(
            Operation::SubscribeNewsletter,
            StoreError::Unavailable("pool timed out".to_string()),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Failed to subscribe to newsletter. Please try again."
            })
        );
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = body_json(AppError::product_not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Product not found" }));
    }
}
