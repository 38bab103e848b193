//! Error types for the content publisher and the cache synchronizer.

use std::path::PathBuf;
use thiserror::Error;

/// Build-time errors. Every variant aborts the build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to read source {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write publish output {path:?}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl BuildError {
    pub(crate) fn source_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::SourceRead {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn publish(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Publish {
            path: path.into(),
            source,
        }
    }
}

/// Client cache store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cache store backend error: {0}")]
    Backend(String),

    #[error("Cache store I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Client synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Response from {url} is not a valid document: {message}")]
    Decode { url: String, message: String },

    #[error("Node {0} cannot be addressed by the configured path scheme")]
    Unaddressable(String),

    #[error("Failed to load app data. Please try again later.")]
    ManifestUnavailable,

    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
}

/// Top-level errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("Cache error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
