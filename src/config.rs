//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Content root; one subdirectory per download
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("downloads"),
        }
    }
}

/// Retrieval gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Path to the `yt-dlp` executable
    pub program: PathBuf,

    /// Subtitle languages, most preferred first
    pub subtitle_langs: Vec<String>,

    /// Fall back to automatically generated captions
    pub auto_captions: bool,

    /// Convert the audio to this format (mp3, m4a, ...); native container when unset
    pub audio_format: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            subtitle_langs: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
            auto_captions: true,
            audio_format: None,
        }
    }
}

/// Where subtitle segments come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleSource {
    /// Parse the `.srt` file downloaded next to the audio
    File,
    /// Ask the gateway for a transcript keyed by video id
    Transcript,
}

/// Request pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub subtitle_source: SubtitleSource,

    /// Fail the request with 400 when no subtitles are found
    pub require_subtitles: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subtitle_source: SubtitleSource::File,
            require_subtitles: false,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub storage: StorageConfig,

    pub gateway: GatewayConfig,

    pub pipeline: PipelineConfig,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
            pipeline: PipelineConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
