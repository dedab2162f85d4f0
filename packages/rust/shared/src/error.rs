//! Error types for peanut-backstage.
//!
//! Library crates use [`PeanutError`] via `thiserror`.
//! The binary wraps this with `color-eyre` for rich diagnostics.

use std::num::ParseIntError;
use std::path::PathBuf;

/// Top-level error type for all peanut-backstage operations.
#[derive(Debug, thiserror::Error)]
pub enum PeanutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Labels or annotations could not be read from a workload object.
    #[error("failed to extract metadata: {message}")]
    Extraction { message: String },

    /// A link annotation key carries a sequence suffix that is not a
    /// non-negative integer.
    #[error("failed to parse link annotation {key:?}: {source}")]
    LinkParse {
        key: String,
        source: ParseIntError,
    },

    /// Listing workload objects from the cluster (or manifests) failed.
    #[error("cluster error: {0}")]
    Cluster(String),

    /// Entity document encoding error.
    #[error("encode error: {0}")]
    Encode(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PeanutError>;

impl PeanutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create a link parse error for the offending annotation key.
    pub fn link_parse(key: impl Into<String>, source: ParseIntError) -> Self {
        Self::LinkParse {
            key: key.into(),
            source,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error comes from reading the objects themselves rather
    /// than from fetching them.
    pub fn is_discovery_error(&self) -> bool {
        matches!(self, Self::Extraction { .. } | Self::LinkParse { .. })
    }
}
