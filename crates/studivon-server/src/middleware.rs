//! Middleware for the REST API server.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Requests slower than this are logged at warn level.
const SLOW_REQUEST_MS: u128 = 2_000;

/// Create CORS middleware. The study dashboard is served from another origin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Request logging middleware.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();
    if elapsed_ms > SLOW_REQUEST_MS {
        // Coaching calls may sit in the retry backoff.
        tracing::warn!(method = %method, path = %path, status, elapsed_ms, "Slow request");
    } else {
        tracing::info!(method = %method, path = %path, status, elapsed_ms, "Request completed");
    }

    response
}
