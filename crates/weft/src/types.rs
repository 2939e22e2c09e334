//! Domain types for transfer logs and graph caching.
//!
//! - **Records**: [`Address`], [`Transfer`], [`TransferLog`] (the cleaned
//!   tabular input)
//! - **Selection**: [`GraphKind`], [`DateRange`]
//! - **Cache identity**: [`CacheKey`] (parameter tuple → artifact filename)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// An opaque blockchain address.
///
/// Addresses are treated as identifiers only; no checksum or hex validation
/// is applied. The newtype keeps source and destination columns from being
/// mixed up with arbitrary strings in signatures.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Creates an address from anything string-like.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logged value movement between two addresses at a point in time.
///
/// Field names match the columns of the cleaned transfer store: `date`,
/// `from_address`, `to_address`, `value_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// When the transfer happened.
    pub date: DateTime<Utc>,
    /// Source address.
    pub from_address: Address,
    /// Destination address.
    pub to_address: Address,
    /// Transferred amount, denominated in the token.
    pub value_token: f64,
}

impl Transfer {
    /// Convenience constructor, mostly for tests and embedders.
    pub fn new(
        date: DateTime<Utc>,
        from_address: impl Into<Address>,
        to_address: impl Into<Address>,
        value_token: f64,
    ) -> Self {
        Self {
            date,
            from_address: from_address.into(),
            to_address: to_address.into(),
            value_token,
        }
    }

    /// Whether the transfer is a self-edge (source equals destination).
    ///
    /// The standard cleaning path removes these upstream, but they remain
    /// valid input and become self-loops in the graph.
    #[must_use]
    pub fn is_self_transfer(&self) -> bool {
        self.from_address == self.to_address
    }
}

/// An ordered sequence of transfer records.
///
/// Rows are immutable once loaded; the log is the sole input to graph
/// construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferLog {
    transfers: Vec<Transfer>,
}

impl TransferLog {
    /// Wraps a vector of records.
    #[must_use]
    pub fn new(transfers: Vec<Transfer>) -> Self {
        Self { transfers }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Whether the log has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Iterates the rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Transfer> {
        self.transfers.iter()
    }

    /// Content fingerprint of the log (xxh3-64 over all rows, in order).
    ///
    /// Used by the opt-in cache keying mode: two logs with identical rows in
    /// identical order produce the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for t in &self.transfers {
            hasher.update(&t.date.timestamp_micros().to_le_bytes());
            hasher.update(t.from_address.as_str().as_bytes());
            hasher.update(&[0]);
            hasher.update(t.to_address.as_str().as_bytes());
            hasher.update(&[0]);
            hasher.update(&t.value_token.to_bits().to_le_bytes());
        }
        hasher.digest()
    }
}

impl FromIterator<Transfer> for TransferLog {
    fn from_iter<I: IntoIterator<Item = Transfer>>(iter: I) -> Self {
        Self {
            transfers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TransferLog {
    type Item = &'a Transfer;
    type IntoIter = std::slice::Iter<'a, Transfer>;

    fn into_iter(self) -> Self::IntoIter {
        self.transfers.iter()
    }
}

/// The two canonical graph variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// Edge set only; duplicate (source, destination) pairs collapse.
    Unweighted,
    /// Each edge carries the summed `value_token` over its pairs.
    Weighted,
}

impl GraphKind {
    /// Short tag used in cache filenames.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unweighted => "unw",
            Self::Weighted => "w",
        }
    }

    /// Whether edges of this kind carry weights.
    #[must_use]
    pub fn is_weighted(&self) -> bool {
        matches!(self, Self::Weighted)
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unweighted => f.write_str("unweighted"),
            Self::Weighted => f.write_str("weighted"),
        }
    }
}

/// Optional inclusive calendar-date bounds for slicing a transfer log.
///
/// A missing bound is unbounded on that side. A record is in range when its
/// calendar date (UTC) lies inside `[start, end]`; the whole end day is
/// included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// The range with no bounds on either side.
    pub const UNBOUNDED: Self = Self {
        start: None,
        end: None,
    };

    /// Creates a range from optional bounds.
    #[must_use]
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Whether neither bound is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether the given calendar date falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Deterministic identity of a cached graph artifact.
///
/// Composed from the parameter tuple (kind, threshold, date range, optional
/// table fingerprint) as a readable string, not a hash: identical tuples map
/// to identical filenames, any differing parameter changes the filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: GraphKind,
    threshold: u32,
    range: DateRange,
    fingerprint: Option<u64>,
}

impl CacheKey {
    /// Derives the key for a parameter tuple.
    #[must_use]
    pub fn new(kind: GraphKind, threshold: u32, range: DateRange) -> Self {
        Self {
            kind,
            threshold,
            range,
            fingerprint: None,
        }
    }

    /// Mixes a table content fingerprint into the key.
    ///
    /// Changes the artifact location whenever the underlying table changes;
    /// see `Config::fingerprint_tables` for the trade-off.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    /// The graph kind this key addresses.
    #[must_use]
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Artifact filename: `G_<kind>_min<threshold>[_<start>_<end>].json`.
    ///
    /// A half-open date range leaves the missing side empty, e.g.
    /// `G_w_min5_2023-04-14_.json`. When a fingerprint is mixed in, an
    /// `_x<hex>` segment precedes the extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        let mut name = format!("G_{}_min{}", self.kind.as_str(), self.threshold);
        if !self.range.is_unbounded() {
            let start = self.range.start.map(|d| d.to_string()).unwrap_or_default();
            let end = self.range.end.map(|d| d.to_string()).unwrap_or_default();
            name.push_str(&format!("_{start}_{end}"));
        }
        if let Some(fp) = self.fingerprint {
            name.push_str(&format!("_x{fp:016x}"));
        }
        name.push_str(".json");
        name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
