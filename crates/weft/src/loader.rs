//! Loading cleaned transfer tables.
//!
//! Tables are pre-materialized per activity threshold by the upstream
//! preprocessing step; the loader only selects the right file and applies
//! optional date slicing. It performs no activity filtering of its own.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DateRange, Transfer, TransferLog};
use std::fs::File;
use std::io::ErrorKind;
use tracing::debug;

/// Loads the cleaned transfer table for a threshold, optionally sliced to
/// an inclusive date range.
///
/// Rows are parsed strictly: the table is a schema-bearing input, and a row
/// missing `date`, `from_address`, `to_address`, or `value_token` (or
/// carrying the wrong type) fails the whole load rather than degrading into
/// silent zero values. Blank lines are tolerated.
///
/// # Errors
///
/// - [`Error::TableNotFound`] when no table file exists for the threshold.
/// - [`Error::MalformedTable`] when a row violates the schema, with the
///   offending line number.
/// - [`Error::Io`] when reading fails mid-file.
pub fn load_transfers(config: &Config, threshold: u32, range: DateRange) -> Result<TransferLog> {
    let path = config.table_path(threshold);
    let file = File::open(&path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::TableNotFound {
                threshold,
                path: path.clone(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    let rows: Vec<Transfer> = weft_jsonl::read_jsonl(file).map_err(|e| match e {
        weft_jsonl::Error::Json { line, source } => Error::MalformedTable {
            path: path.clone(),
            line,
            reason: source.to_string(),
        },
        weft_jsonl::Error::InvalidFormat(reason) => Error::MalformedTable {
            path: path.clone(),
            line: 0,
            reason,
        },
        weft_jsonl::Error::Io(io) => Error::Io(io),
    })?;

    let total = rows.len();
    let log: TransferLog = rows
        .into_iter()
        .filter(|t| range.contains(t.date.date_naive()))
        .collect();
    debug!(
        table = %path.display(),
        threshold,
        rows = total,
        in_range = log.len(),
        "loaded transfer table"
    );
    Ok(log)
}
