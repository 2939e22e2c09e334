//! Error types for weft-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for weft-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A line could not be parsed or serialized as JSON.
    #[error("JSON error at line {line}: {source}")]
    Json {
        /// The 1-based line number where parsing failed.
        line: usize,
        /// The underlying parse or serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid JSONL structure (not attributable to a single line).
    #[error("invalid JSONL: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// Returns the line number for line-scoped errors.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Json { line, .. } => Some(*line),
            Self::Io(_) | Self::InvalidFormat(_) => None,
        }
    }
}

/// A specialized Result type for weft-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
