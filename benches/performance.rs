//! Performance benchmarks for the key-path store.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keypath_store::{flatten, inflate, Scalar, Store, SubscriptionConfig, Value};
use serde_json::json;

/// A record with `width` children per level, `depth` levels deep.
fn wide_tree(width: usize, depth: usize) -> serde_json::Value {
    if depth == 0 {
        return json!("leaf");
    }
    let mut map = serde_json::Map::new();
    for i in 0..width {
        map.insert(format!("k{}", i), wide_tree(width, depth - 1));
    }
    serde_json::Value::Object(map)
}

/// Benchmark flatten/inflate over trees of growing size
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for depth in [2, 3, 4] {
        let value: Value = wide_tree(8, depth).into();
        let flat = flatten(&value, "", ".");

        group.bench_with_input(BenchmarkId::new("flatten", depth), &value, |b, value| {
            b.iter(|| flatten(black_box(value), "", "."));
        });

        group.bench_with_input(BenchmarkId::new("inflate", depth), &flat, |b, flat| {
            b.iter(|| inflate(black_box(flat), "", "."));
        });
    }

    group.finish();
}

/// Benchmark sub-tree replacement with a live subscriber
fn bench_set_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_object");

    for depth in [2, 3] {
        let first = wide_tree(8, depth);
        let second = wide_tree(6, depth);

        group.bench_with_input(BenchmarkId::new("replace", depth), &depth, |b, _| {
            let mut store = Store::new();
            let handle = store.subscribe(SubscriptionConfig::default());

            b.iter(|| {
                store.set_object(first.clone(), false);
                store.set_object(second.clone(), false);
                handle.drain();
            });
        });
    }

    group.finish();
}

/// Benchmark single-value writes into a populated store
fn bench_set_value(c: &mut Criterion) {
    let mut store = Store::new();
    store.set_object(wide_tree(8, 3), true);
    let mut n = 0i64;

    c.bench_function("set_value", |b| {
        b.iter(|| {
            n += 1;
            store.set_value_for_path(Scalar::from(n), black_box("k3.k4.k5"), false);
        });
    });
}

criterion_group!(benches, bench_transform, bench_set_object, bench_set_value);
criterion_main!(benches);
