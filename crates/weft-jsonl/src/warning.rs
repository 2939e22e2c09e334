//! Warning types for non-fatal problems during resilient JSONL reads.
//!
//! The resilient reader in [`crate::reader`] keeps going when an individual
//! line is unusable; each skipped line is reported as a [`Warning`] so the
//! caller can decide whether the loss matters.

/// A non-fatal problem encountered on one line of a JSONL file.
///
/// Every variant carries the 1-based line number where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A non-empty line contained JSON that could not be parsed into the
    /// requested record type.
    MalformedJson {
        /// The 1-based line number where the error occurred.
        line_number: usize,
        /// A description of the JSON parsing error.
        error: String,
    },

    /// A line was skipped for a reason other than malformed JSON.
    SkippedLine {
        /// The 1-based line number that was skipped.
        line_number: usize,
        /// The reason the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a static string identifying the warning kind, for
    /// programmatic filtering without pattern matching.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => {
                write!(f, "line {line_number}: skipped: {reason}")
            }
        }
    }
}

impl std::error::Error for Warning {}
