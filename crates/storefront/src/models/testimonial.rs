//! Testimonial domain type.

use serde::{Deserialize, Serialize};

use crumb_haven_core::TestimonialId;

/// A customer testimonial. Display fields only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub location: Option<String>,
    /// Star rating, 1-5.
    pub rating: i16,
    pub content: String,
}
