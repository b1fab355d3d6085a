//! Newsletter subscription handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{SubmissionResponse, form_body};
use crate::db::StoreError;
use crate::error::{AppError, Operation, Result};
use crate::models::{NewNewsletterSubscription, NewsletterForm};
use crate::state::AppState;

const SUBSCRIBED_MESSAGE: &str = "Subscribed to newsletter successfully";

/// Subscribe an email to the newsletter.
///
/// POST /api/newsletter
///
/// An address that is already subscribed is answered exactly like a new
/// one, so the endpoint does not reveal who is on the list.
#[instrument(skip(state, payload))]
pub async fn subscribe(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewsletterForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    let form = form_body(payload)?;

    let subscription = NewNewsletterSubscription::from_form(&form, Utc::now())
        .inspect_err(|e| debug!(issues = ?e.issues(), "Newsletter form rejected"))?;

    match state
        .store()
        .create_newsletter_subscription(subscription)
        .await
    {
        Ok(stored) => info!(subscription_id = %stored.id, "Newsletter subscription created"),
        Err(StoreError::Conflict(reason)) => info!(%reason, "Already subscribed"),
        Err(e) => return Err(AppError::submission(Operation::SubscribeNewsletter, e)),
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::ok(SUBSCRIBED_MESSAGE)),
    ))
}
