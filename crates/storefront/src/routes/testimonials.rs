//! Testimonial handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, Operation, Result};
use crate::models::Testimonial;
use crate::state::AppState;

/// List testimonials.
///
/// GET /api/testimonials
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Arc<Vec<Testimonial>>>> {
    let testimonials = state
        .catalog()
        .testimonials()
        .await
        .map_err(|e| AppError::catalog(Operation::Testimonials, e))?;
    Ok(Json(testimonials))
}
