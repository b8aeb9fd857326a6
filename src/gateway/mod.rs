//! Video retrieval gateway
//!
//! The gateway is the boundary to the media platform:
//! - Metadata lookup (title, duration) without downloading media
//! - Audio + subtitle download into an artifact directory
//! - Direct transcript retrieval keyed by the platform's video id
//!
//! All operations are blocking. Callers on the async runtime must move them
//! onto the blocking thread pool.

pub mod video_id;
pub mod ytdlp;

use std::path::Path;
use thiserror::Error;

use crate::subtitle::TranscriptEntry;

pub use video_id::extract_video_id;
pub use ytdlp::YtDlpGateway;

/// Metadata returned by a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    /// Platform-native id, when the platform reports one
    pub id: Option<String>,
    pub title: String,
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
}

/// Gateway operation, used for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Metadata,
    Download,
    Transcript,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Metadata => write!(f, "metadata lookup"),
            Operation::Download => write!(f, "download"),
            Operation::Transcript => write!(f, "transcript retrieval"),
        }
    }
}

/// Errors reported by a gateway operation
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The URL is not something the platform can handle
    #[error("Unsupported URL: {0}")]
    Unsupported(String),

    /// The media exists in principle but cannot be retrieved (private, removed, ...)
    #[error("Video unavailable: {0}")]
    Unavailable(String),

    /// The operation failed for a reason not attributable to the request
    #[error("{operation} failed: {message}")]
    Failed {
        operation: Operation,
        message: String,
    },

    /// The retrieval tool could not be started, or its files could not be read
    #[error("Retrieval I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The retrieval tool produced output we could not decode
    #[error("Failed to decode retrieval output: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether the failure is caused by the request rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Unsupported(_) | GatewayError::Unavailable(_)
        )
    }
}

/// Media retrieval capability the request handler depends on.
pub trait VideoGateway: Send + Sync {
    /// Look up title and duration without downloading media.
    fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, GatewayError>;

    /// Download the best audio track, and subtitles when available, into `target_dir`.
    ///
    /// The audio file is named `audio.<ext>`; subtitles end in `.srt`.
    fn download(&self, url: &str, target_dir: &Path) -> Result<(), GatewayError>;

    /// Fetch a timed transcript directly, without going through a subtitle file.
    ///
    /// An empty list means the video has no transcript.
    fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptEntry>, GatewayError>;
}
