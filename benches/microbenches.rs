//! Criterion microbenches for the windowed join and coalescing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - the sweep join against the nested-loop reference, for a narrow window
//! - coalescing a dense set of short detections
//! - JSON loading of the detection fixture

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use stalgebra::merge;
use stalgebra::model::io_json::from_json_str;
use stalgebra::model::{Axis, Bounds, Interval};
use stalgebra::IntervalSet;

const DETECTIONS_FIXTURE: &str = include_str!("../tests/fixtures/detections_valid.json");

/// Detections one tenth of a second long, spaced a quarter second apart,
/// drifting across the frame.
fn track(n: usize, offset: f64) -> IntervalSet<usize> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.25 + offset;
            let x = (i % 10) as f64 / 10.0;
            Interval::new(Bounds::new(t, t + 0.1, x, x + 0.1, 0.2, 0.6), i)
        })
        .collect()
}

fn bench_join(c: &mut Criterion) {
    let pred = Axis::T.before(Some(0.5)).and(Axis::X.overlaps());
    // wide enough for the 0.5 gap plus the default epsilon
    let window = 0.6;

    let mut group = c.benchmark_group("join");
    for n in [100usize, 1_000] {
        let a = track(n, 0.0);
        let b = track(n, 0.05);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(BenchmarkId::new("windowed", n), &n, |bench, _| {
            bench.iter(|| {
                let out = a.join(black_box(&b), |x, y| pred.test(x, y), merge::span_pair, window);
                black_box(out)
            })
        });
        group.bench_with_input(BenchmarkId::new("naive", n), &n, |bench, _| {
            bench.iter(|| {
                let out =
                    a.join_naive(black_box(&b), |x, y| pred.test(x, y), merge::span_pair, window);
                black_box(out)
            })
        });
    }
    group.finish();
}

fn bench_coalesce(c: &mut Criterion) {
    let set = track(10_000, 0.0);
    let touches = Axis::T.with_epsilon(0.2).meets_or_overlaps();

    let mut group = c.benchmark_group("coalesce");
    group.throughput(Throughput::Elements(set.len() as u64));
    group.bench_function("coalesce_within", |b| {
        b.iter(|| {
            let out = black_box(set.clone()).coalesce_within(
                |x, y| touches.test(x, y),
                merge::first_payload,
                0.2,
            );
            black_box(out)
        })
    });
    group.finish();
}

fn bench_json_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("detections_parse");
    group.throughput(Throughput::Bytes(DETECTIONS_FIXTURE.len() as u64));

    group.bench_function("from_json_str", |b| {
        b.iter(|| {
            let mapping = from_json_str(black_box(DETECTIONS_FIXTURE)).unwrap();
            black_box(mapping)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_join, bench_coalesce, bench_json_parse);
criterion_main!(benches);
