//! Sequence marshalling benchmarks
//!
//! Measures copy-by-value primitives against boxed record transfer.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smartpy::marshal::{constants_to_list, f64s_to_list, list_to_constants, list_to_f64s};
use smartpy::runtime::{Heap, Object};
use smartpy::Constants;

fn bench_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("f64");
    let heap = Heap::new();

    for size in [16, 256, 4096].iter() {
        let values: Vec<f64> = (0..*size).map(|i| i as f64 * 0.5).collect();
        let list = Object::List(f64s_to_list(&heap, &values).unwrap());

        group.bench_with_input(BenchmarkId::new("to_foreign", size), &values, |b, values| {
            b.iter(|| f64s_to_list(&heap, black_box(values)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("to_native", size), &list, |b, list| {
            b.iter(|| list_to_f64s(&heap, black_box(list)).unwrap());
        });
    }

    group.finish();
}

fn bench_constants(c: &mut Criterion) {
    let mut group = c.benchmark_group("constants");
    let heap = Heap::new();

    for size in [16, 256].iter() {
        let consts: Vec<Constants> = (0..*size).map(|i| Constants::new(i, 4)).collect();
        let list = Object::List(constants_to_list(&heap, &consts).unwrap());

        group.bench_with_input(BenchmarkId::new("to_foreign", size), &consts, |b, consts| {
            b.iter(|| constants_to_list(&heap, black_box(consts)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("to_native", size), &list, |b, list| {
            b.iter(|| list_to_constants(&heap, black_box(list)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_f64, bench_constants);
criterion_main!(benches);
