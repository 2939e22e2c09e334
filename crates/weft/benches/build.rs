//! Aggregation benchmarks for graph construction.

use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use weft::{GraphKind, Transfer, TransferGraph, TransferLog};

/// Deterministic pseudo-random log: `rows` transfers over `addresses`
/// distinct endpoints. A fixed LCG keeps runs comparable.
fn synthetic_log(rows: u64, addresses: u64) -> TransferLog {
    let ts = Utc.with_ymd_and_hms(2023, 4, 14, 0, 0, 0).unwrap();
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        state >> 33
    };
    (0..rows)
        .map(|_| {
            let from = next() % addresses;
            let to = next() % addresses;
            #[allow(clippy::cast_precision_loss)]
            let value = (next() % 10_000) as f64 / 100.0;
            Transfer::new(ts, format!("0x{from:040x}"), format!("0x{to:040x}"), value)
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let log = synthetic_log(10_000, 500);

    c.bench_function("build_unweighted_10k_rows", |b| {
        b.iter(|| TransferGraph::from_log(GraphKind::Unweighted, black_box(&log)));
    });

    c.bench_function("build_weighted_10k_rows", |b| {
        b.iter(|| TransferGraph::from_log(GraphKind::Weighted, black_box(&log)));
    });
}

fn bench_artifact_round_trip(c: &mut Criterion) {
    let log = synthetic_log(10_000, 500);
    let graph = TransferGraph::from_log(GraphKind::Weighted, &log);
    let json = serde_json::to_string(&graph).unwrap();

    c.bench_function("serialize_weighted_artifact", |b| {
        b.iter(|| serde_json::to_string(black_box(&graph)).unwrap());
    });

    c.bench_function("deserialize_weighted_artifact", |b| {
        b.iter(|| serde_json::from_str::<TransferGraph>(black_box(&json)).unwrap());
    });
}

criterion_group!(benches, bench_aggregation, bench_artifact_round_trip);
criterion_main!(benches);
