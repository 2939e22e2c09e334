//! Configuration for data and cache locations.

use std::path::{Path, PathBuf};

/// Where weft reads cleaned tables from and caches graph artifacts.
///
/// Constructed once and passed down; nothing in the library consults
/// module-level paths.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the cleaned per-threshold transfer tables.
    pub data_dir: PathBuf,
    /// Directory graph artifacts are cached under.
    pub cache_dir: PathBuf,
    /// Filename stem of the transfer tables
    /// (`<table_stem>_min<threshold>.jsonl`).
    pub table_stem: String,
    /// Mix a content fingerprint of the loaded table into cache keys.
    ///
    /// Off by default, which preserves the classic behavior of trusting any
    /// existing artifact even after the underlying table was regenerated.
    pub fingerprint_tables: bool,
}

impl Config {
    /// Convention-based layout rooted at a project directory:
    /// tables under `<root>/data/clean`, artifacts under
    /// `<root>/data/clean/graph_cache`.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        let data_dir = root.join("data").join("clean");
        let cache_dir = data_dir.join("graph_cache");
        Self {
            data_dir,
            cache_dir,
            table_stem: "transfers".to_string(),
            fingerprint_tables: false,
        }
    }

    /// The table file for an activity threshold.
    #[must_use]
    pub fn table_path(&self, threshold: u32) -> PathBuf {
        self.data_dir
            .join(format!("{}_min{}.jsonl", self.table_stem, threshold))
    }
}
