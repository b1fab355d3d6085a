//! Write-once form submissions: contact messages and newsletter sign-ups.
//!
//! Incoming forms are deserialized leniently (every field optional) and then
//! validated into `New*` types, so that a missing or malformed field produces
//! one human-readable message instead of a framework rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crumb_haven_core::{ContactSubmissionId, Email, NewsletterSubscriptionId};

/// Maximum length of the contact name.
pub const MAX_NAME_LENGTH: usize = 120;
/// Maximum length of the contact subject.
pub const MAX_SUBJECT_LENGTH: usize = 200;
/// Maximum length of the contact message.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// One or more user-correctable problems with a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation error: {}", .issues.join("; "))]
pub struct ValidationError {
    issues: Vec<String>,
}

impl ValidationError {
    /// A validation error with a single issue.
    #[must_use]
    pub fn single(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }

    /// The individual issues, in field order.
    #[must_use]
    pub fn issues(&self) -> &[String] {
        &self.issues
    }
}

/// Contact form as received from the client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A validated contact submission ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewContactSubmission {
    /// Validate a contact form.
    ///
    /// Text fields are trimmed; the email is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every missing, oversized or
    /// malformed field.
    pub fn from_form(form: ContactForm, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();

        let name = required_text(form.name, "Name", MAX_NAME_LENGTH, &mut issues);
        let email = required_email(form.email.as_deref(), &mut issues);
        let subject = required_text(form.subject, "Subject", MAX_SUBJECT_LENGTH, &mut issues);
        let message = required_text(form.message, "Message", MAX_MESSAGE_LENGTH, &mut issues);

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) if issues.is_empty() => {
                Ok(Self {
                    name,
                    email,
                    subject,
                    message,
                    created_at,
                })
            }
            _ => Err(ValidationError { issues }),
        }
    }
}

/// A persisted contact submission. Never read back through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: ContactSubmissionId,
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Newsletter form as received from the client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NewsletterForm {
    pub email: Option<String>,
}

/// A validated newsletter subscription ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNewsletterSubscription {
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl NewNewsletterSubscription {
    /// Validate a newsletter form.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the email is missing or malformed.
    pub fn from_form(form: &NewsletterForm, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();
        match required_email(form.email.as_deref(), &mut issues) {
            Some(email) => Ok(Self { email, created_at }),
            None => Err(ValidationError { issues }),
        }
    }
}

/// A persisted newsletter subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscription {
    pub id: NewsletterSubscriptionId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

fn required_text(
    value: Option<String>,
    label: &str,
    max: usize,
    issues: &mut Vec<String>,
) -> Option<String> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        issues.push(format!("{label} is required"));
        return None;
    }
    if value.chars().count() > max {
        issues.push(format!("{label} must be at most {max} characters"));
        return None;
    }
    Some(value.to_string())
}

fn required_email(value: Option<&str>, issues: &mut Vec<String>) -> Option<Email> {
    match value.map(Email::normalize) {
        Some(Ok(email)) => Some(email),
        Some(Err(_)) | None => {
            issues.push(INVALID_EMAIL_MESSAGE.to_string());
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: Some("  Asha  ".to_string()),
            email: Some("Asha@Example.com".to_string()),
            subject: Some("Bulk order".to_string()),
            message: Some("Do you ship to Pune?".to_string()),
        }
    }

    #[test]
    fn test_contact_valid_form_is_normalized() {
        let submission = NewContactSubmission::from_form(form(), Utc::now()).unwrap();
        assert_eq!(submission.name, "Asha");
        assert_eq!(submission.email.as_str(), "asha@example.com");
        assert_eq!(submission.subject, "Bulk order");
    }

    #[test]
    fn test_contact_invalid_email() {
        let err = NewContactSubmission::from_form(
            ContactForm {
                email: Some("not-an-email".to_string()),
                ..form()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.issues(), ["Please enter a valid email address"]);
        assert_eq!(
            err.to_string(),
            "Validation error: Please enter a valid email address"
        );
    }

    #[test]
    fn test_contact_reports_every_missing_field() {
        let err = NewContactSubmission::from_form(ContactForm::default(), Utc::now()).unwrap_err();
        assert_eq!(
            err.issues(),
            [
                "Name is required",
                "Please enter a valid email address",
                "Subject is required",
                "Message is required",
            ]
        );
    }

    #[test]
    fn test_contact_blank_fields_are_missing() {
        let err = NewContactSubmission::from_form(
            ContactForm {
                subject: Some("   ".to_string()),
                ..form()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.issues(), ["Subject is required"]);
    }

    #[test]
    fn test_contact_message_too_long() {
        let err = NewContactSubmission::from_form(
            ContactForm {
                message: Some("x".repeat(MAX_MESSAGE_LENGTH + 1)),
                ..form()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.issues(), ["Message must be at most 5000 characters"]);
    }

    #[test]
    fn test_newsletter_validation() {
        let ok = NewNewsletterSubscription::from_form(
            &NewsletterForm {
                email: Some("a@b.com".to_string()),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ok.email.as_str(), "a@b.com");

        assert!(NewNewsletterSubscription::from_form(&NewsletterForm::default(), Utc::now()).is_err());
    }
}
