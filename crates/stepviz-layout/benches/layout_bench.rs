//! Benchmarks for the stepviz layout engine
//!
//! Measures performance of:
//! - Heap-as-tree placement at growing sizes
//! - Hash-table placement with long chains

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stepviz_layout::{HashLayout, ImplicitTree, TreeLayout};

/// Benchmark the work-list tree placement
fn bench_tree_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_place");

    for &len in &[1usize, 15, 255, 4095, 65_535] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let shape = ImplicitTree::new(len);
            b.iter(|| TreeLayout::HEAP.place(black_box(&shape), 1200.0))
        });
    }
    group.finish();
}

/// Benchmark bucket and chain placement
fn bench_hash_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_place");
    let layout = HashLayout::default();

    for &chain in &[0usize, 4, 64] {
        let lengths = vec![chain; 10];
        group.bench_with_input(BenchmarkId::new("chain", chain), &lengths, |b, lengths| {
            b.iter(|| layout.place(black_box(lengths)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tree_place, bench_hash_place);
criterion_main!(benches);
