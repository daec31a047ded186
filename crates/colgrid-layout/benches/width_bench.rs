//! Benchmarks for the width model and metrics derivation.
//!
//! Run with: cargo bench -p colgrid-layout

use colgrid_layout::{MIN_WIDTH, MetricsCache, clamp_pair, derive_metrics, normalize};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn skewed_widths(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 3 == 0 { 0.5 } else { 10.0 + i as f64 }).collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("width/normalize");
    for n in [2, 5, 10] {
        let raw = skewed_widths(n);
        group.bench_with_input(BenchmarkId::new("skewed", n), &raw, |b, raw| {
            b.iter(|| black_box(normalize(raw, MIN_WIDTH)))
        });
    }
    group.finish();
}

fn bench_drag_frame(c: &mut Criterion) {
    // One drag frame: clamp the pair, rebuild the vector, normalize.
    let start = normalize(&skewed_widths(10), MIN_WIDTH);
    c.bench_function("width/drag_frame_10", |b| {
        b.iter(|| {
            let (a, z) = clamp_pair(start[3], start[4], black_box(7.5), MIN_WIDTH);
            let mut next = start.clone();
            next[3] = a;
            next[4] = z;
            black_box(normalize(&next, MIN_WIDTH))
        })
    });
}

fn bench_metrics(c: &mut Criterion) {
    let widths = normalize(&skewed_widths(10), MIN_WIDTH);
    c.bench_function("metrics/derive_10", |b| {
        b.iter(|| black_box(derive_metrics(&widths, black_box(1280.0), 16.0)))
    });

    let mut cache = MetricsCache::default();
    c.bench_function("metrics/cached_10", |b| {
        b.iter(|| black_box(cache.get_or_derive(&widths, 1280.0, 16.0).handles.len()))
    });
}

criterion_group!(benches, bench_normalize, bench_drag_frame, bench_metrics);
criterion_main!(benches);
