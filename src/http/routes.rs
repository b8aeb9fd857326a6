//! Axum router configuration

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{
    download_video, health_check, not_found, process_video, serve_audio, serve_audio_file,
    version_check,
};
use super::middleware::request_logger;

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health and version endpoints
        .route("/api/health", get(health_check))
        .route("/api/version", get(version_check))
        // Retrieval
        .route("/api/download", post(download_video))
        .route("/api/process-video", post(process_video))
        // Stored audio
        .route("/api/audio/{id}", get(serve_audio))
        .route("/api/audio/{download_id}/{filename}", get(serve_audio_file))
        .fallback(not_found)
        // Middleware
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http());

    if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
            .allow_headers([
                header::ACCEPT,
                header::RANGE,
                header::CONTENT_TYPE,
                header::ORIGIN,
            ])
            .max_age(Duration::from_secs(3600));
        router = router.layer(cors);
    }

    router.with_state(state)
}
