//! HTTP request handlers
//!
//! Implements handlers for all `/api` endpoints.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower::util::ServiceExt;
use tower_http::services::ServeFile;

use crate::pipeline::{PipelineError, ProcessedVideo, Variant};
use crate::state::AppState;
use crate::subtitle::Segment;

/// HTTP error type, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            HttpError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            HttpError::InternalError(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<PipelineError> for HttpError {
    fn from(err: PipelineError) -> Self {
        if err.is_client_error() {
            HttpError::BadRequest(err.to_string())
        } else {
            HttpError::InternalError(err.to_string())
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Body of `POST /api/download` and `POST /api/process-video`
#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub url: Option<String>,
}

/// Response of `POST /api/download`
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub download_id: String,
    pub title: String,
    pub duration: f64,
    pub audio_file: String,
    pub subtitles: Vec<Segment>,
    pub has_subtitles: bool,
}

impl From<ProcessedVideo> for DownloadResponse {
    fn from(video: ProcessedVideo) -> Self {
        Self {
            has_subtitles: !video.subtitles.is_empty(),
            download_id: video.download_id,
            title: video.title,
            duration: video.duration,
            audio_file: video.audio_file,
            subtitles: video.subtitles,
        }
    }
}

/// One subtitle line in the `process-video` response
#[derive(Debug, Serialize)]
pub struct SubtitleLine {
    pub id: usize,
    pub start: f64,
    pub duration: f64,
    pub text: String,
    pub end: f64,
}

/// Response of `POST /api/process-video`
#[derive(Debug, Serialize)]
pub struct ProcessVideoResponse {
    pub video_id: String,
    pub title: String,
    pub duration: f64,
    pub audio_url: String,
    pub subtitles: Vec<SubtitleLine>,
    pub has_subtitles: bool,
    pub success: bool,
}

impl From<ProcessedVideo> for ProcessVideoResponse {
    fn from(video: ProcessedVideo) -> Self {
        let subtitles: Vec<SubtitleLine> = video
            .subtitles
            .into_iter()
            .enumerate()
            .map(|(id, s)| SubtitleLine {
                id,
                start: s.start,
                duration: s.duration(),
                end: s.end,
                text: s.text,
            })
            .collect();

        Self {
            video_id: video.video_id.unwrap_or_else(|| video.download_id.clone()),
            title: video.title,
            duration: video.duration,
            audio_url: format!("/api/audio/{}/{}", video.download_id, video.audio_file),
            has_subtitles: !subtitles.is_empty(),
            subtitles,
            success: true,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Version information endpoint
pub async fn version_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Download audio and subtitles for a video
/// POST /api/download
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, HttpError> {
    let Json(request) = payload?;
    let video = run_pipeline(&state, request.url, Variant::Download).await?;
    Ok(Json(video.into()))
}

/// Download audio and subtitles, keyed by the platform's video id
/// POST /api/process-video
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<ProcessVideoResponse>, HttpError> {
    let Json(request) = payload?;
    let video = run_pipeline(&state, request.url, Variant::ProcessVideo).await?;
    Ok(Json(video.into()))
}

/// Serve a named file of an artifact
/// GET /api/audio/{download_id}/{filename}
pub async fn serve_audio_file(
    State(state): State<Arc<AppState>>,
    Path((download_id, filename)): Path<(String, String)>,
    request: Request,
) -> Result<Response, HttpError> {
    let path = state
        .store()
        .resolve_file(&download_id, &filename)
        .ok_or_else(|| HttpError::NotFound("File not found".to_string()))?;
    serve_path(path, request).await
}

/// Serve the audio of an artifact or a flat `<id>.<ext>` file
/// GET /api/audio/{id}
pub async fn serve_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Response, HttpError> {
    let path = state
        .store()
        .resolve_audio(&id)
        .ok_or_else(|| HttpError::NotFound("File not found".to_string()))?;
    serve_path(path, request).await
}

/// Fallback for unknown routes
pub async fn not_found() -> HttpError {
    HttpError::NotFound("Not found".to_string())
}

// The gateway blocks for as long as the download takes; keep it off the runtime threads.
async fn run_pipeline(
    state: &AppState,
    url: Option<String>,
    variant: Variant,
) -> Result<ProcessedVideo, HttpError> {
    let handler = Arc::clone(&state.handler);
    let video = tokio::task::spawn_blocking(move || handler.process(url.as_deref(), variant))
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))??;
    Ok(video)
}

async fn serve_path(path: PathBuf, request: Request) -> Result<Response, HttpError> {
    tracing::debug!("Serving {:?}", path);
    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new))
}
