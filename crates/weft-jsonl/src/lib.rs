//! Synchronous JSONL (JSON Lines) reading and atomic file writing.
//!
//! This library provides the file I/O substrate for weft data stores: strict
//! and resilient line-by-line readers, a buffered writer, and crash-safe
//! whole-file writes using the temp-file-then-rename pattern.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_bytes_atomic, write_jsonl_atomic};
pub use error::{Error, Result};
pub use reader::{read_jsonl, read_jsonl_file, read_jsonl_file_resilient, read_jsonl_resilient};
pub use warning::Warning;
pub use writer::JsonlWriter;
