//! HTTP middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Request logging middleware
pub async fn request_logger(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() || status.is_redirection() {
        info!("{} {} {} in {:?}", method, uri, status, duration);
    } else {
        warn!("{} {} {} in {:?}", method, uri, status, duration);
    }

    response
}
