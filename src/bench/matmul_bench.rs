use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use matmul_kernels::harness::random_matrix;
use matmul_kernels::{
    Matrix, MultiplyOptions, Strategy, matmul_naive_ijk, matmul_naive_ikj, multiply_into,
};

const SIZES: &[usize] = &[64, 128, 256];

fn flops(size: usize) -> u64 {
    2 * (size as u64).pow(3)
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul");
    group.sample_size(10);
    let opts = MultiplyOptions::default();

    for &size in SIZES {
        let a = random_matrix(size, size, 1).unwrap();
        let b = random_matrix(size, size, 2).unwrap();
        let mut out = Matrix::zeros(size, size).unwrap();
        group.throughput(Throughput::Elements(flops(size)));

        for strategy in Strategy::ALL {
            group.bench_with_input(BenchmarkId::new(strategy.name(), size), &size, |bench, _| {
                bench.iter(|| {
                    multiply_into(black_box(&a), black_box(&b), strategy, &opts, &mut out).unwrap()
                })
            });
        }
    }
    group.finish();
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocked_tile");
    group.sample_size(10);

    let size = 256;
    let a = random_matrix(size, size, 1).unwrap();
    let b = random_matrix(size, size, 2).unwrap();
    let mut out = Matrix::zeros(size, size).unwrap();
    group.throughput(Throughput::Elements(flops(size)));

    for block in [16, 32, 64, 128] {
        let opts = MultiplyOptions::default().with_block_size(block);
        group.bench_with_input(BenchmarkId::from_parameter(block), &block, |bench, _| {
            bench.iter(|| {
                multiply_into(black_box(&a), black_box(&b), Strategy::Blocked, &opts, &mut out)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_lane_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorized_lanes");
    group.sample_size(10);

    let size = 256;
    let a = random_matrix(size, size, 1).unwrap();
    let b = random_matrix(size, size, 2).unwrap();
    let mut out = Matrix::zeros(size, size).unwrap();
    group.throughput(Throughput::Elements(flops(size)));

    for lanes in [1, 4, 8, 16] {
        let opts = MultiplyOptions::default().with_lane_width(lanes);
        group.bench_with_input(BenchmarkId::from_parameter(lanes), &lanes, |bench, _| {
            bench.iter(|| {
                multiply_into(black_box(&a), black_box(&b), Strategy::Vectorized, &opts, &mut out)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_loop_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_order");
    group.sample_size(10);

    for &size in SIZES {
        let a = random_matrix(size, size, 1).unwrap();
        let b = random_matrix(size, size, 2).unwrap();
        let mut out = vec![0.0; size * size];
        group.throughput(Throughput::Elements(flops(size)));

        group.bench_with_input(BenchmarkId::new("ijk", size), &size, |bench, &n| {
            bench.iter(|| {
                matmul_naive_ijk(black_box(a.as_slice()), black_box(b.as_slice()), &mut out, n, n, n)
            })
        });
        group.bench_with_input(BenchmarkId::new("ikj", size), &size, |bench, &n| {
            bench.iter(|| {
                matmul_naive_ikj(black_box(a.as_slice()), black_box(b.as_slice()), &mut out, n, n, n)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_block_sizes,
    bench_lane_widths,
    bench_loop_order
);
criterion_main!(benches);
