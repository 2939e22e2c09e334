//! Error types for weft operations.
//!
//! The taxonomy mirrors how failures propagate:
//!
//! - [`Error::TableNotFound`] and [`Error::MalformedTable`] are fatal to the
//!   calling operation. There is nothing to retry against: the input store
//!   either lacks the table or the table violates its schema.
//! - [`Error::SerializationFailed`] degrades gracefully inside the builder:
//!   the in-memory graph is still valid and returned, the failure is logged.
//! - [`Error::DeserializationFailed`] is recovered inside the builder by
//!   rebuilding from the source table; callers only see it when asking the
//!   store directly.

use std::path::PathBuf;
use thiserror::Error;

/// The error type for weft operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No pre-materialized transfer table exists for the requested threshold.
    #[error("no transfer table for threshold {threshold}: {}", .path.display())]
    TableNotFound {
        /// The activity threshold that was requested.
        threshold: u32,
        /// The path that was probed.
        path: PathBuf,
    },

    /// The transfer table violates the expected row schema.
    #[error("malformed transfer table {} (line {line}): {reason}", .path.display())]
    MalformedTable {
        /// The table file that failed to parse.
        path: PathBuf,
        /// The 1-based line number of the offending row.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// A graph artifact could not be written to the cache.
    #[error("failed to write graph artifact {}: {reason}", .path.display())]
    SerializationFailed {
        /// The artifact path that could not be written.
        path: PathBuf,
        /// The underlying failure.
        reason: String,
    },

    /// A cached graph artifact could not be read back.
    #[error("failed to read graph artifact {}: {reason}", .path.display())]
    DeserializationFailed {
        /// The artifact path that could not be read.
        path: PathBuf,
        /// The underlying failure.
        reason: String,
    },

    /// Infrastructure I/O failure outside the categories above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for weft operations.
pub type Result<T> = std::result::Result<T, Error>;
