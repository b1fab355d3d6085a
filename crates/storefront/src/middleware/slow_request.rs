//! Slow request logging.

use std::time::Duration;

use axum::{extract::Request, middleware::Next, response::Response};
use tokio::time::Instant;

/// Requests taking longer than this are logged at WARN.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(100);

/// Log requests that exceed [`SLOW_REQUEST_THRESHOLD`].
pub async fn slow_request_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    if is_slow(elapsed) {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = response.status().as_u16(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Slow request"
        );
    }

    response
}

const fn is_slow(elapsed: Duration) -> bool {
    elapsed.as_millis() > SLOW_REQUEST_THRESHOLD.as_millis()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, routing::get};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_threshold() {
        assert!(!is_slow(Duration::from_millis(99)));
        assert!(!is_slow(SLOW_REQUEST_THRESHOLD));
        assert!(is_slow(Duration::from_millis(101)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_passes_through() {
        let app = Router::new()
            .route(
                "/",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                    "done"
                }),
            )
            .layer(axum::middleware::from_fn(slow_request_middleware));

        let response = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
