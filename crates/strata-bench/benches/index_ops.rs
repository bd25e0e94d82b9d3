//! Criterion micro-benchmarks for index insert, lookup and removal.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use strata_bench::{bench_keys, filled_bucketed, filled_ordered};
use strata_index::{IndexConfig, OrderedIndex};

const KEYS: usize = 10_000;

fn bench_set(c: &mut Criterion) {
    let keys = bench_keys(KEYS, 42);
    let mut group = c.benchmark_group("index_set_10k");
    group.bench_function("ordered", |b| {
        b.iter(|| black_box(filled_ordered(&keys).unwrap()));
    });
    group.bench_function("bucketed_64", |b| {
        b.iter(|| black_box(filled_bucketed(&keys, 64).unwrap()));
    });
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let keys = bench_keys(KEYS, 42);
    let probes = bench_keys(KEYS, 7);
    let ordered = filled_ordered(&keys).unwrap();
    let bucketed = filled_bucketed(&keys, 64).unwrap();

    let mut group = c.benchmark_group("index_lookup_10k");
    group.bench_function("ordered", |b| {
        b.iter(|| probes.iter().filter(|&&k| ordered.contains(k)).count());
    });
    group.bench_function("bucketed_64", |b| {
        b.iter(|| probes.iter().filter(|&&k| bucketed.contains(k)).count());
    });
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let keys = bench_keys(KEYS, 42);
    let mut group = c.benchmark_group("index_remove_10k");
    group.bench_function("ordered", |b| {
        b.iter_batched(
            || filled_ordered(&keys).unwrap(),
            |mut index| {
                for &k in &keys {
                    black_box(index.remove(k).unwrap());
                }
                index
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("bucketed_64", |b| {
        b.iter_batched(
            || filled_bucketed(&keys, 64).unwrap(),
            |mut index| {
                for &k in &keys {
                    black_box(index.remove(k).unwrap());
                }
                index
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_extend_then_set(c: &mut Criterion) {
    let keys = bench_keys(KEYS, 42);
    c.bench_function("index_set_10k_preextended", |b| {
        b.iter_batched(
            || {
                let mut index = OrderedIndex::<u32>::new(IndexConfig::new(16)).unwrap();
                index.extend(KEYS).unwrap();
                index
            },
            |mut index| {
                for &k in &keys {
                    index.set(k).unwrap();
                }
                index
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_set,
    bench_lookup,
    bench_remove,
    bench_extend_then_set
);
criterion_main!(benches);
