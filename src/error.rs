//! Error types for the gallery

use std::path::PathBuf;
use thiserror::Error;

/// Failures while fetching, decoding or optimizing a single asset.
///
/// A fetch error never leaves the loader that issued the request: it is
/// turned into the terminal `Errored` state. Payloads are plain strings so
/// the error can travel inside cloneable UI messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Local asset does not exist
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Local asset exists but could not be read
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("Server answered {status} for {url}")]
    Status { status: u16, url: String },

    /// Bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Re-encoding at the requested quality failed
    #[error("Failed to encode optimized image: {0}")]
    Encode(String),

    /// Blocking worker panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => FetchError::Http(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(err: tokio::task::JoinError) -> Self {
        FetchError::Join(err.to_string())
    }
}

/// Failures while reading gallery content (the ordered media list)
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read content file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid aspect ratio: {0:?}")]
    InvalidAspectRatio(String),
}

/// Failures while loading the gallery configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Startup failures of the showcase application
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No content file given and no default location available")]
    NoContent,
}
