//! Contact form handler.
//!
//! Submissions are validated, then written straight to the Data Store.
//! Nothing here is cached and a failed write is not retried.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{SubmissionResponse, form_body};
use crate::error::{AppError, Operation, Result};
use crate::models::{ContactForm, NewContactSubmission};
use crate::state::AppState;

/// Submit the contact form.
///
/// POST /api/contact
#[instrument(skip(state, payload))]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    let form = form_body(payload)?;

    let submission = NewContactSubmission::from_form(form, Utc::now())
        .inspect_err(|e| debug!(issues = ?e.issues(), "Contact form rejected"))?;

    let stored = state
        .store()
        .create_contact_submission(submission)
        .await
        .map_err(|e| AppError::submission(Operation::SubmitContact, e))?;

    info!(submission_id = %stored.id, "Contact form submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::ok("Contact form submitted successfully")),
    ))
}
