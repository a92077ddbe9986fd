//! Error types for resource-set operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by resource-set operations.
///
/// The type is `Clone` on purpose: the outcome of an outstanding addition must
/// reach both the caller that scheduled it and any number of concurrent
/// [`when_all_added`](crate::ResourceSet::when_all_added) waiters. Underlying
/// io/glob errors are captured as strings at the point of wrapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetError {
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("{label}: '{}' matched no files or resources", .patterns.join("', '"))]
    UnmatchedPatterns {
        label: String,
        patterns: Vec<String>,
    },

    #[error("'{}' matched no files", .patterns.join("', '"))]
    NoMatches { patterns: Vec<String> },

    #[error("Failed loading {context}: {message}")]
    Resolve { context: String, message: String },

    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("missing member '{member}' for combined resource '{path}'")]
    MissingMember { path: String, member: String },

    #[error("cannot add '{path}' to load path: not in the resource set")]
    NotInSet { path: String },

    #[error("io error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("processor '{processor}' failed on {path}: {message}")]
    Processor {
        processor: String,
        path: String,
        message: String,
    },

    #[error("{0}")]
    Internal(String),
}

impl SetError {
    /// Wrap an io error, keeping the offending path.
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
