//! Product catalog handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{debug, instrument};

use crumb_haven_core::Slug;

use crate::error::{AppError, Operation, Result};
use crate::models::{Product, ProductDetails};
use crate::state::AppState;

/// List all products.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Arc<Vec<Product>>>> {
    let products = state
        .catalog()
        .products()
        .await
        .map_err(|e| AppError::catalog(Operation::ListProducts, e))?;
    Ok(Json(products))
}

/// Get a product with its feature lines.
///
/// GET /api/products/{slug}
///
/// A slug that could never exist is answered with 404 without touching
/// the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Arc<ProductDetails>>> {
    let slug = Slug::parse(&slug).map_err(|e| {
        debug!(slug = %slug, error = %e, "Rejected malformed slug");
        AppError::product_not_found()
    })?;

    let details = state
        .catalog()
        .product_details(&slug)
        .await
        .map_err(|e| AppError::catalog(Operation::GetProduct, e))?;
    Ok(Json(details))
}

/// List featured products.
///
/// GET /api/featured-products
#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Result<Json<Arc<Vec<Product>>>> {
    let products = state
        .catalog()
        .featured_products()
        .await
        .map_err(|e| AppError::catalog(Operation::FeaturedProducts, e))?;
    Ok(Json(products))
}
