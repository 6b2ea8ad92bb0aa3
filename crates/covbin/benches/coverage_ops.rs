//! Coverage Model Benchmarks
//!
//! Benchmarks for bin insertion, sampling and next-stimulus selection.
//!
//! Run with: `cargo bench --bench coverage_ops`

use covbin::{gen_bin, gen_values, BinOptions, CoverageModel};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn crossed_model(per_dim: i64, merging: bool) -> CoverageModel {
    let mut model = CoverageModel::named("bench");
    model.set_merging(merging);
    model
        .add_cross(
            &BinOptions::new(),
            &[gen_bin(0, 255, per_dim), gen_bin(0, 255, per_dim)],
        )
        .unwrap();
    model
}

fn bench_cross_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_insertion");

    for per_dim in [8, 16, 32] {
        for merging in [false, true] {
            let name = format!("{per_dim}x{per_dim}_merging_{merging}");
            group.bench_with_input(
                BenchmarkId::from_parameter(name),
                &(per_dim, merging),
                |bench, &(n, m)| {
                    bench.iter(|| black_box(crossed_model(black_box(n), m)));
                },
            );
        }
    }

    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");

    for per_dim in [8, 32] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_bins", per_dim * per_dim)),
            &per_dim,
            |bench, &n| {
                let mut model = crossed_model(n, false);
                let mut i: i64 = 0;
                bench.iter(|| {
                    i = i.wrapping_add(1);
                    let point = [(i * 7) & 255, (i * 13) & 255];
                    model.record(black_box(&point)).unwrap();
                });
            },
        );
    }

    group.bench_function("repeat_same_bin", |bench| {
        let mut model = CoverageModel::new();
        model.add_bins(&BinOptions::new(), gen_values(&(0..256).collect::<Vec<_>>())).unwrap();
        bench.iter(|| model.record(black_box(&[200])).unwrap());
    });

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    for per_dim in [8, 32] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("rand_point_{}_bins", per_dim * per_dim)),
            &per_dim,
            |bench, &n| {
                let mut model = crossed_model(n, false);
                bench.iter(|| {
                    let point = model.rand_point(100.0).unwrap();
                    model.record(&point).unwrap();
                    black_box(point);
                });
            },
        );
    }

    group.bench_function("min_index_1024_bins", |bench| {
        let mut model = crossed_model(32, false);
        bench.iter(|| black_box(model.min_index().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_cross_insertion, bench_record, bench_selection);
criterion_main!(benches);
