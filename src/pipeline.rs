//! Request pipeline
//!
//! Turns a video URL into a stored audio artifact plus timed subtitles.
//! Every request walks the same stages:
//!
//! ```text
//! received -> metadata-fetched -> media-downloaded -> subtitles-resolved -> responded
//!     \______________\__________________\____________________\______> failed
//! ```
//!
//! The work is blocking (the gateway runs external tools); run it on the
//! blocking thread pool.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::config::{PipelineConfig, SubtitleSource};
use crate::gateway::{extract_video_id, GatewayError, VideoGateway};
use crate::storage::{Artifact, ArtifactFiles, ArtifactStore};
use crate::subtitle::{parse_srt_file, Segment};

/// Request lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    MetadataFetched,
    MediaDownloaded,
    SubtitlesResolved,
    Responded,
    Failed,
}

/// Which endpoint family the request came in on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `POST /api/download`
    Download,
    /// `POST /api/process-video`; requires a recognisable video id
    ProcessVideo,
}

/// Errors that end a request
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch video info: {0}")]
    Metadata(#[source] GatewayError),

    #[error("Failed to download video: {0}")]
    Download(#[source] GatewayError),

    #[error("Failed to download audio")]
    NoAudio,

    #[error("No subtitles found for this video")]
    NoSubtitles,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Request worker failed: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Whether the request itself is at fault (as opposed to the environment).
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::MissingUrl
            | PipelineError::InvalidUrl(_)
            | PipelineError::NoSubtitles => true,
            PipelineError::Metadata(e) | PipelineError::Download(e) => e.is_client_error(),
            PipelineError::NoAudio | PipelineError::Storage(_) | PipelineError::Worker(_) => false,
        }
    }
}

/// Result of a successful request
#[derive(Debug, Clone)]
pub struct ProcessedVideo {
    /// Unique storage token of the artifact
    pub download_id: String,
    /// Platform-native id, when one could be extracted from the URL
    pub video_id: Option<String>,
    pub title: String,
    pub duration: f64,
    /// File name of the audio inside the artifact directory
    pub audio_file: String,
    pub subtitles: Vec<Segment>,
}

/// Stage bookkeeping for one request
struct Progress {
    stage: RequestStage,
    started: Instant,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: RequestStage::Received,
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: RequestStage) {
        tracing::debug!(
            "{:?} -> {:?} after {:?}",
            self.stage,
            next,
            self.started.elapsed()
        );
        self.stage = next;
    }
}

/// Orchestrates gateway calls, artifact storage and subtitle parsing.
pub struct RequestHandler {
    gateway: Arc<dyn VideoGateway>,
    store: ArtifactStore,
    options: PipelineConfig,
}

impl RequestHandler {
    pub fn new(gateway: Arc<dyn VideoGateway>, store: ArtifactStore, options: PipelineConfig) -> Self {
        Self {
            gateway,
            store,
            options,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn options(&self) -> &PipelineConfig {
        &self.options
    }

    /// Run a request from URL to response data.
    pub fn process(&self, url: Option<&str>, variant: Variant) -> Result<ProcessedVideo, PipelineError> {
        let mut progress = Progress::new();
        let result = self.run(url, variant, &mut progress);
        match &result {
            Ok(video) => {
                progress.advance(RequestStage::Responded);
                tracing::info!(
                    "Processed {} ({:?}): {} subtitle segments",
                    video.download_id,
                    video.title,
                    video.subtitles.len()
                );
            }
            Err(e) => {
                tracing::warn!("Request failed at {:?}: {}", progress.stage, e);
                progress.advance(RequestStage::Failed);
            }
        }
        result
    }

    fn run(
        &self,
        url: Option<&str>,
        variant: Variant,
        progress: &mut Progress,
    ) -> Result<ProcessedVideo, PipelineError> {
        let url = validate_url(url)?;
        let video_id = extract_video_id(url);
        if variant == Variant::ProcessVideo && video_id.is_none() {
            return Err(PipelineError::InvalidUrl(format!(
                "could not find a video id in {}",
                url
            )));
        }

        let metadata = self
            .gateway
            .fetch_metadata(url)
            .map_err(PipelineError::Metadata)?;
        progress.advance(RequestStage::MetadataFetched);

        let artifact = self.store.create_artifact()?;
        let span = tracing::info_span!("artifact", id = %artifact.id, video = ?metadata.id);
        let _enter = span.enter();

        let outcome = self
            .download(url, &artifact)
            .and_then(|files| {
                progress.advance(RequestStage::MediaDownloaded);
                let subtitles = self.resolve_subtitles(&artifact, &files, video_id.as_deref())?;
                progress.advance(RequestStage::SubtitlesResolved);
                Ok((files, subtitles))
            });

        let (files, subtitles) = match outcome {
            Ok(v) => v,
            Err(e) => {
                self.store.remove_artifact(&artifact);
                return Err(e);
            }
        };

        Ok(ProcessedVideo {
            download_id: artifact.id,
            video_id,
            title: metadata.title,
            duration: metadata.duration,
            // download() guarantees an audio file
            audio_file: files.audio.unwrap_or_default(),
            subtitles,
        })
    }

    fn download(&self, url: &str, artifact: &Artifact) -> Result<ArtifactFiles, PipelineError> {
        self.gateway
            .download(url, &artifact.dir)
            .map_err(PipelineError::Download)?;

        let files = artifact.locate(self.store.subtitle_langs())?;
        if files.audio.is_none() {
            return Err(PipelineError::NoAudio);
        }
        Ok(files)
    }

    fn resolve_subtitles(
        &self,
        artifact: &Artifact,
        files: &ArtifactFiles,
        video_id: Option<&str>,
    ) -> Result<Vec<Segment>, PipelineError> {
        let subtitles = match self.options.subtitle_source {
            SubtitleSource::File => match &files.subtitle {
                Some(name) => {
                    let path = artifact.dir.join(name);
                    parse_srt_file(&path).unwrap_or_else(|e| {
                        tracing::warn!("Error parsing subtitles {:?}: {}", path, e);
                        Vec::new()
                    })
                }
                None => Vec::new(),
            },
            SubtitleSource::Transcript => match video_id {
                Some(id) => match self.gateway.fetch_transcript(id) {
                    Ok(entries) => entries.into_iter().map(Segment::from).collect(),
                    Err(e) => {
                        tracing::warn!("Transcript lookup for {} failed: {}", id, e);
                        Vec::new()
                    }
                },
                None => {
                    tracing::debug!("No video id in URL, skipping transcript lookup");
                    Vec::new()
                }
            },
        };

        if subtitles.is_empty() && self.options.require_subtitles {
            return Err(PipelineError::NoSubtitles);
        }
        Ok(subtitles)
    }
}

/// Check that the URL is present and is an absolute http(s) URL.
pub fn validate_url(url: Option<&str>) -> Result<&str, PipelineError> {
    let url = url.map(str::trim).filter(|u| !u.is_empty());
    let Some(url) = url else {
        return Err(PipelineError::MissingUrl);
    };
    let parsed = url::Url::parse(url).map_err(|e| PipelineError::InvalidUrl(format!("{}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(PipelineError::InvalidUrl(url.to_string()));
    }
    Ok(url)
}
