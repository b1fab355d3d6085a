//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from database row types.
//! Wire names are camelCase to match what the catalog client consumes.

pub mod product;
pub mod seed;
pub mod submission;
pub mod testimonial;

pub use product::{Product, ProductDetails, ProductFeature};
pub use seed::{SeedCatalog, SeedProduct};
pub use submission::{
    ContactForm, ContactSubmission, NewContactSubmission, NewNewsletterSubscription,
    NewsletterForm, NewsletterSubscription, ValidationError,
};
pub use testimonial::Testimonial;
