//! End-to-end tests through the HTTP router

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::util::ServiceExt;

use super::fixtures::{StubGateway, SAMPLE_AUDIO, SAMPLE_SRT, SAMPLE_URL};
use crate::config::{PipelineConfig, ServerConfig, StorageConfig, SubtitleSource};
use crate::gateway::GatewayError;
use crate::http::create_router;
use crate::state::AppState;

struct TestServer {
    root: tempfile::TempDir,
    app: Router,
}

impl TestServer {
    fn new(gateway: StubGateway) -> Self {
        Self::with_pipeline(gateway, PipelineConfig::default())
    }

    fn with_pipeline(gateway: StubGateway, pipeline: PipelineConfig) -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage: StorageConfig {
                root: root.path().to_path_buf(),
            },
            pipeline,
            ..Default::default()
        };
        let state = Arc::new(AppState::with_gateway(config, Arc::new(gateway)));
        Self {
            root,
            app: create_router(state),
        }
    }

    fn artifact_count(&self) -> usize {
        std::fs::read_dir(self.root.path()).unwrap().count()
    }

    async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}

fn url_body(url: &str) -> String {
    serde_json::json!({ "url": url }).to_string()
}

#[tokio::test]
async fn test_download_then_fetch_audio() {
    let server = TestServer::new(StubGateway::with_subtitles(SAMPLE_SRT));

    let (status, json) = server.post_json("/api/download", &url_body(SAMPLE_URL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Sample Video");
    assert_eq!(json["duration"], 212.0);
    assert_eq!(json["audio_file"], "audio.webm");
    assert_eq!(json["has_subtitles"], true);
    assert_eq!(
        json["subtitles"],
        serde_json::json!([
            {"start": 1.0, "end": 2.5, "text": "Hello\nworld"},
            {"start": 2.5, "end": 4.0, "text": "Second line"},
        ])
    );

    let download_id = json["download_id"].as_str().unwrap();
    let (status, body) = server
        .get(&format!("/api/audio/{}/audio.webm", download_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SAMPLE_AUDIO);

    let (status, body) = server.get(&format!("/api/audio/{}", download_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SAMPLE_AUDIO);
}

#[tokio::test]
async fn test_download_without_subtitles() {
    let server = TestServer::new(StubGateway::audio_only());

    let (status, json) = server.post_json("/api/download", &url_body(SAMPLE_URL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["has_subtitles"], false);
    assert_eq!(json["subtitles"], serde_json::json!([]));
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let server = TestServer::new(StubGateway::audio_only());

    let (status, json) = server.post_json("/api/download", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "URL is required");
    assert_eq!(server.artifact_count(), 0);

    let (status, json) = server.post_json("/api/download", r#"{"url": ""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert_eq!(server.artifact_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = TestServer::new(StubGateway::audio_only());

    let (status, json) = server.post_json("/api/download", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert_eq!(server.artifact_count(), 0);
}

#[tokio::test]
async fn test_unknown_audio_is_not_found() {
    let server = TestServer::new(StubGateway::audio_only());

    let (status, body) = server
        .get("/api/audio/00000000-0000-0000-0000-000000000000/audio.webm")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "File not found");

    let (status, _) = server.get("/api/audio/dQw4w9WgXcQ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_flat_layout_audio() {
    let server = TestServer::new(StubGateway::audio_only());
    std::fs::write(server.root.path().join("dQw4w9WgXcQ.mp3"), b"flat audio").unwrap();

    let (status, body) = server.get("/api/audio/dQw4w9WgXcQ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"flat audio");
}

#[tokio::test]
async fn test_process_video_with_transcript() {
    let pipeline = PipelineConfig {
        subtitle_source: SubtitleSource::Transcript,
        ..Default::default()
    };
    let server = TestServer::with_pipeline(StubGateway::audio_only().with_transcript(), pipeline);

    let (status, json) = server
        .post_json("/api/process-video", &url_body("https://youtu.be/dQw4w9WgXcQ"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["video_id"], "dQw4w9WgXcQ");
    assert_eq!(
        json["subtitles"][1],
        serde_json::json!({"id": 1, "start": 2.5, "duration": 1.5, "text": "Second line", "end": 4.0})
    );

    let audio_url = json["audio_url"].as_str().unwrap();
    let (status, body) = server.get(audio_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SAMPLE_AUDIO);
}

#[tokio::test]
async fn test_process_video_rejects_unrecognised_url() {
    let server = TestServer::new(StubGateway::audio_only());

    let (status, json) = server
        .post_json("/api/process-video", &url_body("https://example.com/video"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid URL"));
    assert_eq!(server.artifact_count(), 0);
}

#[tokio::test]
async fn test_required_subtitles_missing() {
    let pipeline = PipelineConfig {
        require_subtitles: true,
        ..Default::default()
    };
    let server = TestServer::with_pipeline(StubGateway::audio_only(), pipeline);

    let (status, json) = server.post_json("/api/process-video", &url_body(SAMPLE_URL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No subtitles found for this video");
    assert_eq!(server.artifact_count(), 0);
}

#[tokio::test]
async fn test_unavailable_video_is_bad_request() {
    let gateway = StubGateway::audio_only().failing_metadata(GatewayError::Unavailable(
        "ERROR: [youtube] dQw4w9WgXcQ: Video unavailable".into(),
    ));
    let server = TestServer::new(gateway);

    let (status, json) = server.post_json("/api/download", &url_body(SAMPLE_URL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Video unavailable"));
}

#[tokio::test]
async fn test_no_audio_is_server_error() {
    let server = TestServer::new(StubGateway::nothing());

    let (status, json) = server.post_json("/api/download", &url_body(SAMPLE_URL)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to download audio");
    assert_eq!(server.artifact_count(), 0);
}

#[tokio::test]
async fn test_live_socket_health() {
    let server = TestServer::new(StubGateway::audio_only());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server.app.clone();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let json: serde_json::Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["status"], "ok");

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/download", addr))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
