//! Write-then-read round trips through the public API.

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use weft_jsonl::{JsonlWriter, read_jsonl_file, write_jsonl_atomic};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Event {
    seq: u64,
    payload: String,
}

fn sample_events(n: u64) -> Vec<Event> {
    (0..n)
        .map(|seq| Event {
            seq,
            payload: format!("payload-{seq}"),
        })
        .collect()
}

#[test]
fn atomic_write_round_trips_through_strict_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.jsonl");
    let events = sample_events(100);

    write_jsonl_atomic(&path, events.iter()).unwrap();
    let loaded: Vec<Event> = read_jsonl_file(&path).unwrap();

    assert_eq!(loaded, events);
}

#[test]
fn buffered_writer_round_trips_through_strict_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.jsonl");
    let events = sample_events(10);

    let file = std::fs::File::create(&path).unwrap();
    let mut writer = JsonlWriter::new(file);
    writer.write_all(events.iter()).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let loaded: Vec<Event> = read_jsonl_file(&path).unwrap();
    assert_eq!(loaded, events);
}

#[test]
fn atomic_rewrite_leaves_no_temp_files_behind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.jsonl");

    write_jsonl_atomic(&path, sample_events(5).iter()).unwrap();
    write_jsonl_atomic(&path, sample_events(3).iter()).unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["events.jsonl".to_string()]);

    let loaded: Vec<Event> = read_jsonl_file(&path).unwrap();
    assert_eq!(loaded.len(), 3);
}

#[test]
fn unicode_payloads_survive_the_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.jsonl");
    let events = vec![Event {
        seq: 1,
        payload: "नमस्ते \u{1F600}".to_string(),
    }];

    write_jsonl_atomic(&path, events.iter()).unwrap();
    let loaded: Vec<Event> = read_jsonl_file(&path).unwrap();

    assert_eq!(loaded, events);
}
