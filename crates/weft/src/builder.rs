//! Graph construction with parameter-addressed caching.
//!
//! One shared routine drives both graph kinds so the cache identity can
//! never drift between them. A build call is one-shot and deterministic
//! given its inputs:
//!
//! ```text
//! START → CACHE_CHECK → CACHE_HIT → RETURN
//!                     ↘ CACHE_MISS → LOCK → RECHECK → AGGREGATE → PERSIST → RETURN
//! ```
//!
//! Two failure modes deliberately do not fail the call: a corrupt cached
//! artifact falls back to a rebuild from the table (the authoritative data
//! is still at hand), and a failed artifact write returns the in-memory
//! graph after logging a warning.

use crate::cache::{GraphStore, StoreLock};
use crate::error::Result;
use crate::graph::TransferGraph;
use crate::types::{CacheKey, DateRange, GraphKind, TransferLog};
use tracing::{debug, warn};

/// Knobs shared by both build entry points.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Consult the store before building and persist after a miss.
    ///
    /// On a hit the input log is ignored entirely: cache presence is
    /// treated as sufficient evidence of validity. This is the original
    /// trade-off of the system; pair with `fingerprint_tables` when the
    /// underlying tables can be regenerated.
    pub use_cache: bool,
    /// Mix a content fingerprint of the log into the cache key, so a
    /// regenerated table resolves to a fresh artifact.
    pub fingerprint_tables: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            fingerprint_tables: false,
        }
    }
}

/// Builds (or fetches) the unweighted graph for this log slice.
///
/// # Errors
///
/// Fails only on infrastructure errors from the store's lock path; cache
/// read and write problems degrade as described on [`build_graph`].
pub fn build_unweighted(
    store: &dyn GraphStore,
    log: &TransferLog,
    threshold: u32,
    range: DateRange,
    options: BuildOptions,
) -> Result<TransferGraph> {
    build_graph(store, GraphKind::Unweighted, log, threshold, range, options)
}

/// Builds (or fetches) the value-weighted graph for this log slice.
///
/// # Errors
///
/// Same conditions as [`build_unweighted`].
pub fn build_weighted(
    store: &dyn GraphStore,
    log: &TransferLog,
    threshold: u32,
    range: DateRange,
    options: BuildOptions,
) -> Result<TransferGraph> {
    build_graph(store, GraphKind::Weighted, log, threshold, range, options)
}

/// The shared build routine behind both kinds.
///
/// With caching enabled, an existing artifact is returned as-is; otherwise
/// the log is aggregated in a single pass and the result persisted under
/// the derived key. The miss path runs under the store's per-key advisory
/// lock and re-checks the store after acquisition, so concurrent writers
/// targeting one key do the work once.
///
/// # Errors
///
/// Returns an error only when the build itself cannot proceed; a corrupt
/// cached artifact triggers a rebuild and a failed persist still returns
/// the freshly built graph (both logged as warnings).
pub fn build_graph(
    store: &dyn GraphStore,
    kind: GraphKind,
    log: &TransferLog,
    threshold: u32,
    range: DateRange,
    options: BuildOptions,
) -> Result<TransferGraph> {
    let mut key = CacheKey::new(kind, threshold, range);
    if options.fingerprint_tables {
        key = key.with_fingerprint(log.fingerprint());
    }

    if !options.use_cache {
        debug!(%key, rows = log.len(), "building graph (cache disabled)");
        return Ok(TransferGraph::from_log(kind, log));
    }

    if let Some(graph) = fetch_cached(store, &key) {
        return Ok(graph);
    }

    // Serialize writers per key; the artifact may appear while we wait.
    let guard = acquire_lock(store, &key);
    if let Some(graph) = fetch_cached(store, &key) {
        return Ok(graph);
    }

    debug!(%key, rows = log.len(), "cache miss, aggregating");
    let graph = TransferGraph::from_log(kind, log);
    if let Err(e) = store.put(&key, &graph) {
        warn!(%key, error = %e, "failed to persist graph artifact; returning in-memory graph");
    }
    drop(guard);
    Ok(graph)
}

/// Fetches the artifact for the key, treating corruption as a miss.
fn fetch_cached(store: &dyn GraphStore, key: &CacheKey) -> Option<TransferGraph> {
    match store.get(key) {
        Ok(found) => found,
        Err(e) => {
            warn!(%key, error = %e, "cached graph artifact unusable; rebuilding from table");
            None
        }
    }
}

/// Takes the per-key lock, degrading to an unlocked build if that fails.
///
/// The lock protects against duplicate work, not correctness: artifact
/// publication is atomic either way.
fn acquire_lock(store: &dyn GraphStore, key: &CacheKey) -> StoreLock {
    match store.lock(key) {
        Ok(guard) => guard,
        Err(e) => {
            warn!(%key, error = %e, "could not take cache lock; building unlocked");
            StoreLock::noop()
        }
    }
}
