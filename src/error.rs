use thiserror::Error;

/// Top-level error type for server startup and configuration
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ServerError>;
