//! Cache behavior: hits, misses, corruption recovery, and key identity.

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;
use weft::{
    BuildOptions, CacheKey, Config, DateRange, Error, FsGraphStore, GraphKind, GraphStore,
    MemoryGraphStore, StoreLock, Transfer, TransferGraph, TransferLog, Weft, build_unweighted,
    build_weighted,
};

fn log(rows: &[(&str, &str, f64)]) -> TransferLog {
    let ts = Utc.with_ymd_and_hms(2023, 4, 14, 12, 0, 0).unwrap();
    rows.iter()
        .map(|(from, to, value)| Transfer::new(ts, *from, *to, *value))
        .collect()
}

fn fs_store(dir: &TempDir) -> FsGraphStore {
    FsGraphStore::open(dir.path().join("graph_cache")).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const CACHED: BuildOptions = BuildOptions {
    use_cache: true,
    fingerprint_tables: false,
};

const UNCACHED: BuildOptions = BuildOptions {
    use_cache: false,
    fingerprint_tables: false,
};

#[test]
fn cache_hit_returns_original_graph_and_ignores_new_table() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);

    let original = build_weighted(
        &store,
        &log(&[("a", "b", 10.0)]),
        0,
        DateRange::UNBOUNDED,
        CACHED,
    )
    .unwrap();

    // Entirely different table, same parameters: the hit wins.
    let from_cache = build_weighted(
        &store,
        &log(&[("x", "y", 99.0), ("y", "z", 1.0)]),
        0,
        DateRange::UNBOUNDED,
        CACHED,
    )
    .unwrap();

    assert_eq!(from_cache, original);
}

#[test]
fn clearing_the_cache_forces_a_fresh_build() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);
    let new_table = log(&[("x", "y", 99.0), ("y", "z", 1.0)]);

    let original = build_weighted(
        &store,
        &log(&[("a", "b", 10.0)]),
        0,
        DateRange::UNBOUNDED,
        CACHED,
    )
    .unwrap();

    store.clear().unwrap();

    let rebuilt = build_weighted(&store, &new_table, 0, DateRange::UNBOUNDED, CACHED).unwrap();
    let direct = build_weighted(&store, &new_table, 0, DateRange::UNBOUNDED, UNCACHED).unwrap();

    assert_ne!(rebuilt, original);
    assert_eq!(rebuilt, direct);
}

#[test]
fn distinct_parameters_never_collide_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);
    let table = log(&[("a", "b", 1.0)]);
    let may = DateRange::new(Some(date(2023, 5, 1)), Some(date(2023, 5, 31)));

    build_weighted(&store, &table, 0, DateRange::UNBOUNDED, CACHED).unwrap();
    build_weighted(&store, &table, 5, DateRange::UNBOUNDED, CACHED).unwrap();
    build_unweighted(&store, &table, 0, DateRange::UNBOUNDED, CACHED).unwrap();
    build_weighted(&store, &table, 0, may, CACHED).unwrap();

    let artifacts = store.list().unwrap();
    assert_eq!(artifacts.len(), 4);

    let names: Vec<String> = artifacts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"G_w_min0.json".to_string()));
    assert!(names.contains(&"G_w_min5.json".to_string()));
    assert!(names.contains(&"G_unw_min0.json".to_string()));
    assert!(names.contains(&"G_w_min0_2023-05-01_2023-05-31.json".to_string()));
}

#[test]
fn corrupt_artifact_is_rebuilt_from_the_table() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);
    let table = log(&[("a", "b", 10.0), ("b", "c", 2.0)]);
    let key = CacheKey::new(GraphKind::Weighted, 0, DateRange::UNBOUNDED);

    std::fs::write(store.artifact_path(&key), "definitely not json").unwrap();

    let built = build_weighted(&store, &table, 0, DateRange::UNBOUNDED, CACHED).unwrap();
    let direct = build_weighted(&store, &table, 0, DateRange::UNBOUNDED, UNCACHED).unwrap();

    assert_eq!(built, direct);

    // The rebuild replaced the corrupt artifact with a readable one.
    let healed = store.get(&key).unwrap().unwrap();
    assert_eq!(healed, built);
}

#[test]
fn incompatible_artifact_version_is_rebuilt_from_the_table() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);
    let table = log(&[("a", "b", 10.0)]);
    let key = CacheKey::new(GraphKind::Weighted, 0, DateRange::UNBOUNDED);

    std::fs::write(
        store.artifact_path(&key),
        r#"{"format_version":99,"kind":"weighted","edges":[]}"#,
    )
    .unwrap();

    let built = build_weighted(&store, &table, 0, DateRange::UNBOUNDED, CACHED).unwrap();

    assert_eq!(built.edge_count(), 1);
    assert!(built.has_edge(&"a".into(), &"b".into()));
}

/// Store whose writes always fail, delegating everything else.
struct WriteFailingStore {
    inner: MemoryGraphStore,
}

impl GraphStore for WriteFailingStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.inner.exists(key)
    }

    fn get(&self, key: &CacheKey) -> Result<Option<TransferGraph>, Error> {
        self.inner.get(key)
    }

    fn put(&self, key: &CacheKey, _graph: &TransferGraph) -> Result<(), Error> {
        Err(Error::SerializationFailed {
            path: key.file_name().into(),
            reason: "disk full".to_string(),
        })
    }

    fn lock(&self, key: &CacheKey) -> Result<StoreLock, Error> {
        self.inner.lock(key)
    }
}

#[test]
fn failed_persist_still_returns_the_built_graph() {
    let store = WriteFailingStore {
        inner: MemoryGraphStore::new(),
    };
    let table = log(&[("a", "b", 10.0), ("a", "b", 5.0)]);

    let graph = build_weighted(&store, &table, 0, DateRange::UNBOUNDED, CACHED).unwrap();

    assert!((graph.weight(&"a".into(), &"b".into()).unwrap() - 15.0).abs() < 1e-9);
    assert!(store.inner.is_empty());
}

#[test]
fn bypassing_the_cache_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);

    build_weighted(
        &store,
        &log(&[("a", "b", 1.0)]),
        0,
        DateRange::UNBOUNDED,
        UNCACHED,
    )
    .unwrap();

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn persisted_artifacts_leave_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = fs_store(&dir);

    build_weighted(
        &store,
        &log(&[("a", "b", 1.0)]),
        0,
        DateRange::UNBOUNDED,
        CACHED,
    )
    .unwrap();

    let leftovers: Vec<String> = std::fs::read_dir(store.cache_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[test]
fn facade_instances_share_the_on_disk_cache() {
    let dir = TempDir::new().unwrap();
    let range = DateRange::UNBOUNDED;

    let first = Weft::open(dir.path()).unwrap();
    let original = first
        .build_weighted(&log(&[("a", "b", 10.0)]), 0, range, true)
        .unwrap();

    // A second instance (e.g. another notebook kernel) sees the artifact.
    let second = Weft::open(dir.path()).unwrap();
    let from_cache = second
        .build_weighted(&log(&[("x", "y", 99.0)]), 0, range, true)
        .unwrap();

    assert_eq!(from_cache, original);
}

#[test]
fn fingerprinting_resolves_regenerated_tables_to_new_artifacts() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::rooted_at(dir.path());
    config.fingerprint_tables = true;
    let weft = Weft::with_config(config).unwrap();

    let original = weft
        .build_weighted(&log(&[("a", "b", 10.0)]), 0, DateRange::UNBOUNDED, true)
        .unwrap();

    // The "regenerated" table keys differently, so no stale hit.
    let regenerated = weft
        .build_weighted(&log(&[("a", "b", 99.0)]), 0, DateRange::UNBOUNDED, true)
        .unwrap();

    assert_ne!(regenerated, original);
    assert!((regenerated.weight(&"a".into(), &"b".into()).unwrap() - 99.0).abs() < 1e-9);
}
