//! Atomic whole-file writes.
//!
//! On POSIX systems a rename within one filesystem is atomic. Both writers
//! here exploit that: data goes to a sibling temp file first, the temp file
//! is flushed and synced, then renamed over the target. A crash mid-write
//! leaves the previous target intact (plus, at worst, an orphaned `.tmp`
//! that the next successful write of the same target replaces).

use crate::error::Result;
use crate::writer::JsonlWriter;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically writes an iterator of values to a JSONL file.
///
/// The target file either keeps its previous content or contains every line,
/// never a prefix.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created, a value fails to
/// serialize, the write or sync fails, or the final rename fails. On
/// failure the temp file is removed best-effort and the target is untouched.
pub fn write_jsonl_atomic<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let write_result: Result<()> = (|| {
        let file = File::create(&temp_path)?;
        let mut writer = JsonlWriter::new(file);
        writer.write_all(values)?;
        writer.flush()?;
        Ok(())
    })();

    commit_or_cleanup(write_result, &temp_path, path)
}

/// Atomically replaces the file at `path` with the given bytes.
///
/// Same temp-then-rename discipline as [`write_jsonl_atomic`], for callers
/// that already hold a fully serialized document.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created or written, or the
/// final rename fails; the target is untouched on failure.
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let write_result: Result<()> = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    })();

    commit_or_cleanup(write_result, &temp_path, path)
}

/// Publishes the temp file over the target, or cleans up after a failed write.
fn commit_or_cleanup(write_result: Result<()>, temp_path: &Path, path: &Path) -> Result<()> {
    if let Err(e) = write_result {
        let _ = std::fs::remove_file(temp_path);
        return Err(e);
    }
    std::fs::rename(temp_path, path)?;
    Ok(())
}

/// Creates the sibling temp path for an atomic write.
///
/// `data.jsonl` becomes `data.jsonl.tmp`; a path without an extension gets
/// a plain `.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}
