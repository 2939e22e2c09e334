//! Line-by-line JSONL readers.
//!
//! Two reading modes are provided:
//!
//! - **Strict** ([`read_jsonl`]): the first unparsable line aborts the read
//!   with a line-numbered [`Error::Json`]. Use this when the file is a
//!   schema-bearing input and silent data loss is unacceptable.
//! - **Resilient** ([`read_jsonl_resilient`]): unparsable lines are skipped
//!   and reported as [`Warning`]s alongside the successfully parsed records.
//!   Use this for best-effort recovery of partially damaged files.
//!
//! Both modes skip lines that are empty after trimming. I/O failures abort
//! either mode; resilience applies to content, not to infrastructure.

use crate::error::{Error, Result};
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Reads all records from a JSONL source, strictly.
///
/// Each non-blank line must deserialize into `T`; the first line that does
/// not stops the read with [`Error::Json`] carrying the 1-based line number.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, or [`Error::Json`] on the first
/// malformed line.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Record {
///     id: u32,
/// }
///
/// let data = "{\"id\":1}\n{\"id\":2}\n";
/// let records: Vec<Record> = weft_jsonl::read_jsonl(data.as_bytes())?;
/// assert_eq!(records.len(), 2);
/// # Ok::<(), weft_jsonl::Error>(())
/// ```
pub fn read_jsonl<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut records = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            debug!(line_number, "skipping blank line");
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| Error::Json {
            line: line_number,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads all records from a JSONL file, strictly.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, or
/// [`Error::Json`] on the first malformed line.
pub fn read_jsonl_file<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    read_jsonl(File::open(path)?)
}

/// Reads records from a JSONL source, skipping lines that fail to parse.
///
/// Returns the records that parsed together with a [`Warning`] per skipped
/// line. The warnings preserve file order.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails. Content problems never abort the
/// read in this mode.
pub fn read_jsonl_resilient<T, R>(reader: R) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            warnings.push(Warning::SkippedLine {
                line_number,
                reason: "empty line after trim".to_string(),
            });
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => warnings.push(Warning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }
    Ok((records, warnings))
}

/// Reads records from a JSONL file, skipping lines that fail to parse.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
pub fn read_jsonl_file_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    read_jsonl_resilient(File::open(path)?)
}
