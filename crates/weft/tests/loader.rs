//! Loading and slicing the cleaned transfer tables.

use chrono::NaiveDate;
use tempfile::TempDir;
use weft::{Config, DateRange, Error, Transfer, load_transfers};

fn config(dir: &TempDir) -> Config {
    Config::rooted_at(dir.path())
}

/// Writes a table file for the threshold, creating the data directory.
fn write_table(config: &Config, threshold: u32, rows: &[Transfer]) {
    std::fs::create_dir_all(&config.data_dir).unwrap();
    weft_jsonl::write_jsonl_atomic(config.table_path(threshold), rows.iter()).unwrap();
}

fn write_raw_table(config: &Config, threshold: u32, content: &str) {
    std::fs::create_dir_all(&config.data_dir).unwrap();
    std::fs::write(config.table_path(threshold), content).unwrap();
}

fn transfer(date: &str, from: &str, to: &str, value: f64) -> Transfer {
    Transfer::new(
        date.parse().unwrap(),
        from,
        to,
        value,
    )
}

/// Ten rows, one per day over 2023-01-01..2023-01-10, at midday.
fn january_rows() -> Vec<Transfer> {
    (1..=10)
        .map(|day| {
            transfer(
                &format!("2023-01-{day:02}T12:00:00Z"),
                "a",
                "b",
                f64::from(day),
            )
        })
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn loads_the_table_for_the_requested_threshold() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &january_rows());
    write_table(&config, 5, &january_rows()[..3]);

    let all = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap();
    let filtered = load_transfers(&config, 5, DateRange::UNBOUNDED).unwrap();

    assert_eq!(all.len(), 10);
    assert_eq!(filtered.len(), 3);
}

#[test]
fn preserves_row_order() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &january_rows());

    let log = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap();

    let values: Vec<f64> = log.iter().map(|t| t.value_token).collect();
    assert_eq!(values, (1..=10).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn missing_table_is_table_not_found() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &january_rows());

    let err = load_transfers(&config, 20, DateRange::UNBOUNDED).unwrap_err();

    match err {
        Error::TableNotFound { threshold, path } => {
            assert_eq!(threshold, 20);
            assert!(path.ends_with("transfers_min20.jsonl"));
        }
        other => panic!("expected TableNotFound, got {other}"),
    }
}

#[test]
fn start_bound_is_inclusive() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &january_rows());

    let log = load_transfers(
        &config,
        0,
        DateRange::new(Some(date(2023, 1, 5)), None),
    )
    .unwrap();

    assert_eq!(log.len(), 6);
    let first = log.iter().next().unwrap();
    assert_eq!(first.date.date_naive(), date(2023, 1, 5));
}

#[test]
fn end_bound_includes_the_whole_end_day() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut rows = january_rows();
    // A late-in-day record on the boundary date must survive the slice.
    rows.push(transfer("2023-01-07T23:59:59Z", "b", "c", 100.0));
    write_table(&config, 0, &rows);

    let log = load_transfers(
        &config,
        0,
        DateRange::new(None, Some(date(2023, 1, 7))),
    )
    .unwrap();

    assert_eq!(log.len(), 8);
    assert!(log.iter().any(|t| t.value_token == 100.0));
}

#[test]
fn both_bounds_slice_to_a_window() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &january_rows());

    let log = load_transfers(
        &config,
        0,
        DateRange::new(Some(date(2023, 1, 3)), Some(date(2023, 1, 5))),
    )
    .unwrap();

    assert_eq!(log.len(), 3);
}

#[test]
fn unbounded_range_returns_every_row() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &january_rows());

    let log = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap();

    assert_eq!(log.len(), 10);
}

#[test]
fn missing_amount_column_is_malformed_not_zero() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_raw_table(
        &config,
        0,
        concat!(
            "{\"date\":\"2023-01-01T12:00:00Z\",\"from_address\":\"a\",\"to_address\":\"b\",\"value_token\":1.0}\n",
            "{\"date\":\"2023-01-02T12:00:00Z\",\"from_address\":\"a\",\"to_address\":\"b\"}\n",
        ),
    );

    let err = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap_err();

    match err {
        Error::MalformedTable { line, reason, .. } => {
            assert_eq!(line, 2);
            assert!(reason.contains("value_token"));
        }
        other => panic!("expected MalformedTable, got {other}"),
    }
}

#[test]
fn mistyped_amount_is_malformed() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_raw_table(
        &config,
        0,
        "{\"date\":\"2023-01-01T12:00:00Z\",\"from_address\":\"a\",\"to_address\":\"b\",\"value_token\":\"lots\"}\n",
    );

    let err = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap_err();

    assert!(matches!(err, Error::MalformedTable { line: 1, .. }));
}

#[test]
fn blank_lines_are_tolerated() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_raw_table(
        &config,
        0,
        concat!(
            "{\"date\":\"2023-01-01T12:00:00Z\",\"from_address\":\"a\",\"to_address\":\"b\",\"value_token\":1.0}\n",
            "\n",
            "{\"date\":\"2023-01-02T12:00:00Z\",\"from_address\":\"b\",\"to_address\":\"c\",\"value_token\":2.0}\n",
        ),
    );

    let log = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap();

    assert_eq!(log.len(), 2);
}

#[test]
fn self_transfers_load_as_valid_rows() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    write_table(&config, 0, &[transfer("2023-01-01T12:00:00Z", "a", "a", 1.0)]);

    let log = load_transfers(&config, 0, DateRange::UNBOUNDED).unwrap();

    assert_eq!(log.len(), 1);
    assert!(log.iter().next().unwrap().is_self_transfer());
}
