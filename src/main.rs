//! Subtitle + audio retrieval server
//!
//! Given a video URL, downloads the audio track and any available
//! subtitles, and answers with timed subtitle segments plus a reference to
//! the stored audio for playback.

#[macro_use]
mod macros;

mod config;
mod config_file;
mod error;
mod gateway;
mod http;
#[cfg(test)]
mod integration;
mod pipeline;
mod state;
mod storage;
mod subtitle;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::config_file::ConfigFile;
use crate::error::Result;
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "subtrack-server";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (ignored when it does not exist)
    #[arg(default_value = "config.toml")]
    config: PathBuf,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the download storage directory
    #[arg(short = 'd', long)]
    storage_dir: Option<PathBuf>,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

impl Args {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = &self.storage_dir {
            config.storage.root = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", ConfigFile::default_config().to_toml()?);
        return Ok(());
    }

    // Load configuration before logging so the log level can come from it
    let (mut config, load_error) = match config_file::load_config(&args.config) {
        Ok(config) => (config, None),
        Err(e) => (ServerConfig::default(), Some(e)),
    };
    args.apply(&mut config);

    // Initialize logging
    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let Some(e) = load_error {
        tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            args.config.display(),
            e
        );
    }
    tracing::info!("Configuration loaded: {:?}", config);

    // Create application state
    let state = Arc::new(AppState::new(config.clone()));
    state.store().ensure_root()?;
    tracing::info!("Storing downloads in {}", state.store().root().display());

    // Build router
    let app = create_router(state.clone());

    // Start server
    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "subtrack_server={},tower_http={}",
            config.log_level, config.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
