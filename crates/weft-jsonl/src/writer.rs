//! Buffered JSONL writer.

use crate::error::{Error, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};

/// Writes values to an underlying sink as JSON Lines.
///
/// Each value becomes one line of compact JSON terminated by `\n`. Output is
/// buffered; call [`JsonlWriter::flush`] (or drop after [`write_all`]) before
/// relying on the bytes being in the sink.
///
/// [`write_all`]: JsonlWriter::write_all
pub struct JsonlWriter<W: Write> {
    inner: BufWriter<W>,
    lines_written: usize,
}

impl<W: Write> JsonlWriter<W> {
    /// Creates a writer over the given sink.
    pub fn new(sink: W) -> Self {
        Self {
            inner: BufWriter::new(sink),
            lines_written: 0,
        }
    }

    /// Serializes one value as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the value cannot be serialized (the line
    /// number is the 1-based position the value would have occupied), or
    /// [`Error::Io`] if the sink fails.
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value).map_err(|source| Error::Json {
            line: self.lines_written + 1,
            source,
        })?;
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    /// Serializes every value from the iterator, one line each.
    ///
    /// # Errors
    ///
    /// Stops at the first value that fails; earlier lines may already be in
    /// the buffer.
    pub fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value)?;
        }
        Ok(())
    }

    /// Flushes buffered output to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the sink fails.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }
}
