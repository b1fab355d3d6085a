//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, URI, status, latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Slow request logging (`/api` only)
//! 5. API headers (`/api` only: nosniff, XSS protection, cache policy)

pub mod api_headers;
pub mod request_id;
pub mod slow_request;

pub use api_headers::api_headers_middleware;
pub use request_id::request_id_middleware;
pub use slow_request::slow_request_middleware;
