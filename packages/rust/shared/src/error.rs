//! Error types for linkshelf.
//!
//! Library crates use [`LinkshelfError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all linkshelf operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkshelfError {
    /// The input resource list is unreadable or not a JSON array. Aborts the run.
    #[error("format error: {message}")]
    Format { message: String },

    /// A single input entry is malformed (missing or non-http URL).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Connection failure, non-2xx status, or timeout while fetching.
    #[error("network error: {0}")]
    Network(String),

    /// The page was fetched but no usable text could be derived from it.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Writing a document or the processing log failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LinkshelfError>;

impl LinkshelfError {
    /// Create a format error from any displayable message.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
