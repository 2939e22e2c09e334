//! # Weft: transfer-graph construction and caching
//!
//! Weft turns cleaned token-transfer logs into directed graphs for network
//! analysis and caches the results so repeated analysis does not
//! re-aggregate millions of rows. It is designed for programmatic use by
//! notebooks, analysis pipelines, and the bundled CLI.
//!
//! ## Design Philosophy
//!
//! - **Builder and cache, not analyzer** - degree distributions, centrality,
//!   and community detection live downstream; weft hands them a graph
//! - **Parameter-addressed artifacts** - one readable cache filename per
//!   `(kind, threshold, date range)` tuple, never a hash to squint at
//! - **Cache presence is trusted** - a hit ignores the input table by
//!   design; opt into table fingerprinting when tables get regenerated
//! - **Embeddable** - library first, CLI second
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use weft::{DateRange, Weft};
//!
//! let weft = Weft::open(Path::new("/path/to/project"))?;
//!
//! // Load the cleaned table for threshold 5, restricted to May 2023.
//! let range = DateRange::new(
//!     "2023-05-01".parse().ok(),
//!     "2023-05-31".parse().ok(),
//! );
//! let log = weft.load_transfers(5, range)?;
//!
//! // Build (or fetch from cache) the value-weighted graph.
//! let graph = weft.build_weighted(&log, 5, range, true)?;
//! println!("{} vertices, {} edges", graph.vertex_count(), graph.edge_count());
//! # Ok::<(), weft::Error>(())
//! ```

mod builder;
mod cache;
mod config;
mod error;
mod graph;
mod loader;
mod types;

pub use builder::{BuildOptions, build_graph, build_unweighted, build_weighted};
pub use cache::{FsGraphStore, GraphStore, MemoryGraphStore, StoreLock};
pub use config::Config;
pub use error::{Error, Result};
pub use graph::TransferGraph;
pub use loader::load_transfers;
pub use types::{Address, CacheKey, DateRange, GraphKind, Transfer, TransferLog};

/// Transfer-graph workspace: configuration plus a cache store.
///
/// `Weft` is the main entry point for embedders. It owns the cache store as
/// an injected capability, so tests and unusual deployments can swap in
/// [`MemoryGraphStore`] (or anything else implementing [`GraphStore`])
/// without touching the build logic.
pub struct Weft {
    config: Config,
    store: Box<dyn GraphStore>,
}

impl Weft {
    /// Opens a workspace with the convention-based layout under `root`
    /// (tables in `data/clean`, artifacts in `data/clean/graph_cache`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the cache directory cannot be created.
    pub fn open(root: &std::path::Path) -> Result<Self> {
        Self::with_config(Config::rooted_at(root))
    }

    /// Opens a workspace with an explicit configuration, backed by a
    /// filesystem store at `config.cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the cache directory cannot be created.
    pub fn with_config(config: Config) -> Result<Self> {
        let store = FsGraphStore::open(&config.cache_dir)?;
        Ok(Self {
            config,
            store: Box::new(store),
        })
    }

    /// Opens a workspace over an injected cache store.
    #[must_use]
    pub fn with_store(config: Config, store: Box<dyn GraphStore>) -> Self {
        Self { config, store }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The cache store in use.
    #[must_use]
    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    /// Loads the cleaned transfer table for a threshold, sliced to the
    /// inclusive date range.
    ///
    /// # Errors
    ///
    /// See [`load_transfers`].
    pub fn load_transfers(&self, threshold: u32, range: DateRange) -> Result<TransferLog> {
        loader::load_transfers(&self.config, threshold, range)
    }

    /// Builds (or fetches from cache) the unweighted graph for this slice.
    ///
    /// # Errors
    ///
    /// See [`build_graph`].
    pub fn build_unweighted(
        &self,
        log: &TransferLog,
        threshold: u32,
        range: DateRange,
        use_cache: bool,
    ) -> Result<TransferGraph> {
        builder::build_unweighted(
            self.store.as_ref(),
            log,
            threshold,
            range,
            self.options(use_cache),
        )
    }

    /// Builds (or fetches from cache) the value-weighted graph for this
    /// slice.
    ///
    /// # Errors
    ///
    /// See [`build_graph`].
    pub fn build_weighted(
        &self,
        log: &TransferLog,
        threshold: u32,
        range: DateRange,
        use_cache: bool,
    ) -> Result<TransferGraph> {
        builder::build_weighted(
            self.store.as_ref(),
            log,
            threshold,
            range,
            self.options(use_cache),
        )
    }

    fn options(&self, use_cache: bool) -> BuildOptions {
        BuildOptions {
            use_cache,
            fingerprint_tables: self.config.fingerprint_tables,
        }
    }
}
