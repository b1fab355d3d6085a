//! Response headers for the JSON API.
//!
//! Every API response gets:
//! - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
//! - `X-XSS-Protection: 1; mode=block` - Legacy XSS filter
//!
//! Successful `GET`/`HEAD` responses may be cached by the browser for five
//! minutes. Writes and errors must not be cached.

use axum::{
    extract::Request,
    http::{
        HeaderValue, Method,
        header::{CACHE_CONTROL, X_CONTENT_TYPE_OPTIONS, X_XSS_PROTECTION},
    },
    middleware::Next,
    response::Response,
};

/// Cache policy for successful reads.
pub const PUBLIC_CACHE_CONTROL: &str = "public, max-age=300";

/// Cache policy for writes and failures.
pub const NO_STORE_CACHE_CONTROL: &str = "no-store";

/// Add API headers to a response.
pub async fn api_headers_middleware(request: Request, next: Next) -> Response {
    let is_read = matches!(*request.method(), Method::GET | Method::HEAD);

    let mut response = next.run(request).await;
    let cacheable = is_read && response.status().is_success();
    let headers = response.headers_mut();

    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static(if cacheable {
            PUBLIC_CACHE_CONTROL
        } else {
            NO_STORE_CACHE_CONTROL
        }),
    );

    response
}
