//! Configuration file support
//!
//! Loads server configuration from TOML files. Every table is optional;
//! missing values fall back to `ServerConfig::default()`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{
    GatewayConfig, PipelineConfig, ServerConfig, StorageConfig, SubtitleSource,
};
use crate::error::{Result, ServerError};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: Option<ServerSettings>,
    /// Artifact storage settings
    pub storage: Option<StorageSettings>,
    /// Retrieval gateway settings
    pub gateway: Option<GatewaySettings>,
    /// Request pipeline settings
    pub pipeline: Option<PipelineSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: Option<String>,
    /// Port to listen on
    pub port: Option<u16>,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Content root directory
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Path to the yt-dlp executable
    pub program: Option<PathBuf>,
    /// Ranked subtitle languages
    pub subtitle_langs: Option<Vec<String>>,
    /// Fall back to automatic captions
    pub auto_captions: Option<bool>,
    /// Audio output format
    pub audio_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// "file" or "transcript"
    pub subtitle_source: Option<SubtitleSource>,
    /// Treat missing subtitles as a request failure
    pub require_subtitles: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = ServerConfig::default();
        Self {
            server: Some(ServerSettings {
                host: Some(defaults.host),
                port: Some(defaults.port),
                cors_enabled: Some(defaults.cors_enabled),
            }),
            storage: Some(StorageSettings {
                root: defaults.storage.root,
            }),
            gateway: Some(GatewaySettings {
                program: Some(defaults.gateway.program),
                subtitle_langs: Some(defaults.gateway.subtitle_langs),
                auto_captions: Some(defaults.gateway.auto_captions),
                audio_format: defaults.gateway.audio_format,
            }),
            pipeline: Some(PipelineSettings {
                subtitle_source: Some(defaults.pipeline.subtitle_source),
                require_subtitles: Some(defaults.pipeline.require_subtitles),
            }),
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some(defaults.log_format),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let server = self.server;
        let gateway = self.gateway;
        let pipeline = self.pipeline;

        ServerConfig {
            host: server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(defaults.host),
            port: server.as_ref().and_then(|s| s.port).unwrap_or(defaults.port),
            storage: self
                .storage
                .map(|s| StorageConfig { root: s.root })
                .unwrap_or(defaults.storage),
            gateway: match gateway {
                Some(g) => GatewayConfig {
                    program: g.program.unwrap_or(defaults.gateway.program),
                    subtitle_langs: g
                        .subtitle_langs
                        .filter(|l| !l.is_empty())
                        .unwrap_or(defaults.gateway.subtitle_langs),
                    auto_captions: g.auto_captions.unwrap_or(defaults.gateway.auto_captions),
                    audio_format: g.audio_format,
                },
                None => defaults.gateway,
            },
            pipeline: match pipeline {
                Some(p) => PipelineConfig {
                    subtitle_source: p
                        .subtitle_source
                        .unwrap_or(defaults.pipeline.subtitle_source),
                    require_subtitles: p
                        .require_subtitles
                        .unwrap_or(defaults.pipeline.require_subtitles),
                },
                None => defaults.pipeline,
            },
            cors_enabled: server
                .as_ref()
                .and_then(|s| s.cors_enabled)
                .unwrap_or(defaults.cors_enabled),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(defaults.log_format),
        }
    }
}

/// Load a `ServerConfig` from `path`, or the defaults when no such file exists.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    Ok(ConfigFile::from_file(path)?.into_server_config())
}
