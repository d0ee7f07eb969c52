//! Criterion benchmarks: every multiplication method on square inputs.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use matmul::{Engine, EngineConfig, Fill, Grid, Matrix, Variant};

const SIZES: &[usize] = &[64, 128, 256];
const TASKS: usize = 8;

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");
    group.sample_size(20);

    for &size in SIZES {
        let flops = 2 * size * size * size;
        group.throughput(Throughput::Elements(flops as u64));

        let a = Matrix::increment(size, size);
        let b = Matrix::increment(size, size);
        let bt = b.transpose();
        let ga = Grid::new(size, size, Fill::Increment);
        let gb = Grid::new(size, size, Fill::Increment);

        group.bench_with_input(BenchmarkId::new("grid", size), &size, |bench, _| {
            bench.iter(|| black_box(ga.multiply(&gb)));
        });
        group.bench_with_input(BenchmarkId::new("classic", size), &size, |bench, _| {
            bench.iter(|| black_box(matmul::multiply_classic(&a, &b)));
        });
        group.bench_with_input(BenchmarkId::new("transposed", size), &size, |bench, _| {
            bench.iter(|| black_box(matmul::multiply_transposed(&a, &bt)));
        });
    }

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel");
    group.sample_size(20);

    let engine = match Engine::new(EngineConfig {
        threads: None,
        task_count: TASKS,
    }) {
        Ok(engine) => engine,
        Err(e) => panic!("cannot build engine: {e}"),
    };

    for &size in SIZES {
        let flops = 2 * size * size * size;
        group.throughput(Throughput::Elements(flops as u64));

        let a = Matrix::increment(size, size);
        let b = Matrix::increment(size, size);
        let bt = b.transpose();
        let ga = Grid::new(size, size, Fill::Increment);
        let gb = Grid::new(size, size, Fill::Increment);

        group.bench_with_input(BenchmarkId::new("grid", size), &size, |bench, _| {
            bench.iter(|| black_box(ga.try_multiply_with(&engine, &gb)));
        });
        group.bench_with_input(BenchmarkId::new("classic", size), &size, |bench, _| {
            bench.iter(|| black_box(engine.multiply(&a, &b, Variant::Classic)));
        });
        group.bench_with_input(BenchmarkId::new("transposed", size), &size, |bench, _| {
            bench.iter(|| black_box(engine.multiply(&a, &bt, Variant::Transposed)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequential, bench_parallel);
criterion_main!(benches);
