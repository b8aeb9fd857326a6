//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Server configuration
//! - The request pipeline (gateway + artifact store)

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::gateway::{VideoGateway, YtDlpGateway};
use crate::pipeline::RequestHandler;
use crate::storage::ArtifactStore;

/// Application state shared across all handlers
pub struct AppState {
    /// Request pipeline, shared with blocking workers
    pub handler: Arc<RequestHandler>,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState backed by the `yt-dlp` gateway
    pub fn new(config: ServerConfig) -> Self {
        let gateway = Arc::new(YtDlpGateway::new(config.gateway.clone()));
        Self::with_gateway(config, gateway)
    }

    /// Create a new AppState with an explicit gateway
    pub fn with_gateway(config: ServerConfig, gateway: Arc<dyn VideoGateway>) -> Self {
        let store = ArtifactStore::new(config.storage.root.clone())
            .with_subtitle_langs(config.gateway.subtitle_langs.clone());
        let handler = RequestHandler::new(gateway, store, config.pipeline.clone());
        Self {
            handler: Arc::new(handler),
            config,
        }
    }

    /// Artifact store the pipeline writes into
    pub fn store(&self) -> &ArtifactStore {
        self.handler.store()
    }
}
