//! The graph artifact cache.
//!
//! The cache is an injected capability, not module state: the builder works
//! against the [`GraphStore`] trait and callers decide where artifacts live.
//! Two implementations are provided:
//!
//! - [`FsGraphStore`]: one JSON artifact per [`CacheKey`] under a dedicated
//!   directory, shared across process invocations. Writes are atomic
//!   (temp-then-rename) and a per-key advisory lock file serializes writers.
//! - [`MemoryGraphStore`]: an in-process map of serialized artifacts, for
//!   tests and embedders that want request-level caching without disk.

use crate::error::{Error, Result};
use crate::graph::TransferGraph;
use crate::types::CacheKey;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Read/write access to cached graph artifacts, keyed by [`CacheKey`].
pub trait GraphStore {
    /// Whether an artifact exists for the key.
    fn exists(&self, key: &CacheKey) -> bool;

    /// Fetches and deserializes the artifact for the key.
    ///
    /// Returns `Ok(None)` when no artifact exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] when an artifact exists but
    /// cannot be read back (corrupt content, incompatible format version, or
    /// an unreadable file).
    fn get(&self, key: &CacheKey) -> Result<Option<TransferGraph>>;

    /// Serializes and stores the graph under the key, replacing any
    /// previous artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] when the artifact cannot be
    /// written (disk full, permission denied).
    fn put(&self, key: &CacheKey, graph: &TransferGraph) -> Result<()>;

    /// Acquires the per-key advisory write lock, blocking until available.
    ///
    /// The lock is released when the returned guard drops. Readers never
    /// take it; it only serializes the build-and-persist sequence of
    /// concurrent writers targeting the same key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the lock file cannot be created or locked.
    fn lock(&self, key: &CacheKey) -> Result<StoreLock>;
}

/// Guard for a per-key advisory lock; dropping it releases the lock.
#[must_use = "the advisory lock is released as soon as this guard is dropped"]
pub struct StoreLock {
    file: Option<File>,
}

impl StoreLock {
    /// A guard that holds nothing (stores without real locking, or a lock
    /// path that failed and was degraded).
    pub(crate) fn noop() -> Self {
        Self { file: None }
    }

    fn held(file: File) -> Self {
        Self { file: Some(file) }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // Unlock explicitly; closing the descriptor would drop the lock
            // anyway, but a failed unlock is worth surfacing at debug level.
            if let Err(e) = fs2::FileExt::unlock(&file) {
                debug!(error = %e, "failed to release cache lock");
            }
        }
    }
}

// ============================================================================
// Filesystem store
// ============================================================================

/// Artifact-per-file store under a dedicated cache directory.
pub struct FsGraphStore {
    cache_dir: PathBuf,
}

impl FsGraphStore {
    /// Opens a store rooted at `cache_dir`, creating the directory if
    /// needed. Safe to call repeatedly on the same path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created.
    pub fn open(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// The directory artifacts are stored under.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The on-disk path the key resolves to.
    #[must_use]
    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    fn lock_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.lock", key.file_name()))
    }

    /// Lists cached artifact paths, sorted by filename.
    ///
    /// Lock files and in-flight temp files are not artifacts and are
    /// excluded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the cache directory cannot be read.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if Self::is_artifact(&path) {
                artifacts.push(path);
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }

    /// Removes every cached artifact, plus any stale lock and temp files.
    ///
    /// Returns the number of artifacts removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be read or a file
    /// cannot be removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !name.starts_with("G_") {
                continue;
            }
            if Self::is_artifact(&path) {
                removed += 1;
            }
            fs::remove_file(&path)?;
        }
        debug!(removed, cache_dir = %self.cache_dir.display(), "cleared graph cache");
        Ok(removed)
    }

    fn is_artifact(path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        name.starts_with("G_") && name.ends_with(".json")
    }
}

impl GraphStore for FsGraphStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.artifact_path(key).exists()
    }

    fn get(&self, key: &CacheKey) -> Result<Option<TransferGraph>> {
        let path = self.artifact_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::DeserializationFailed {
                    path,
                    reason: e.to_string(),
                });
            }
        };
        let graph = serde_json::from_str(&content).map_err(|e| Error::DeserializationFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(artifact = %path.display(), "cache hit");
        Ok(Some(graph))
    }

    fn put(&self, key: &CacheKey, graph: &TransferGraph) -> Result<()> {
        let path = self.artifact_path(key);
        let bytes = serde_json::to_vec(graph).map_err(|e| Error::SerializationFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        weft_jsonl::write_bytes_atomic(&path, &bytes).map_err(|e| Error::SerializationFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(artifact = %path.display(), "cached graph artifact");
        Ok(())
    }

    fn lock(&self, key: &CacheKey) -> Result<StoreLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key))?;
        file.lock_exclusive()?;
        Ok(StoreLock::held(file))
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-process store keyed by artifact filename.
///
/// Artifacts are held in serialized form so `get` exercises the same
/// round-trip as the filesystem store.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryGraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts
            .lock()
            .expect("artifact map mutex should not be poisoned")
            .len()
    }

    /// Whether the store holds no artifacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every stored artifact.
    pub fn clear(&self) {
        self.artifacts
            .lock()
            .expect("artifact map mutex should not be poisoned")
            .clear();
    }
}

impl GraphStore for MemoryGraphStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.artifacts
            .lock()
            .expect("artifact map mutex should not be poisoned")
            .contains_key(&key.file_name())
    }

    fn get(&self, key: &CacheKey) -> Result<Option<TransferGraph>> {
        let file_name = key.file_name();
        let guard = self
            .artifacts
            .lock()
            .expect("artifact map mutex should not be poisoned");
        let Some(bytes) = guard.get(&file_name) else {
            return Ok(None);
        };
        let graph = serde_json::from_slice(bytes).map_err(|e| Error::DeserializationFailed {
            path: PathBuf::from(file_name),
            reason: e.to_string(),
        })?;
        Ok(Some(graph))
    }

    fn put(&self, key: &CacheKey, graph: &TransferGraph) -> Result<()> {
        let file_name = key.file_name();
        let bytes = serde_json::to_vec(graph).map_err(|e| Error::SerializationFailed {
            path: PathBuf::from(&file_name),
            reason: e.to_string(),
        })?;
        self.artifacts
            .lock()
            .expect("artifact map mutex should not be poisoned")
            .insert(file_name, bytes);
        Ok(())
    }

    fn lock(&self, _key: &CacheKey) -> Result<StoreLock> {
        Ok(StoreLock::noop())
    }
}
