// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::{Point, Rect};
use understory_grid_index::{FlatIndex, GridConfig, GridIndex, Positioned, SpatialQuery};

const WORLD: f64 = 10_000.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Generates `count` points uniformly spread over `[0, WORLD]^2`.
fn gen_points(count: usize) -> Vec<Positioned<u32>> {
    let mut rng = Rng::new(0x81FD_BEE7_94F0_AF1A);
    (0..count)
        .map(|i| Positioned::new(i as u32, rng.next_f64() * WORLD, rng.next_f64() * WORLD))
        .collect()
}

/// Viewport-sized query windows at random offsets.
fn gen_windows(count: usize) -> Vec<Rect> {
    let mut rng = Rng::new(0x3C6E_F35F_4750_2932);
    (0..count)
        .map(|_| {
            let origin = Point::new(rng.next_f64() * (WORLD - 800.0), rng.next_f64() * (WORLD - 600.0));
            Rect::from_origin_size(origin, (800.0, 600.0))
        })
        .collect()
}

fn build_grid(points: &[Positioned<u32>]) -> GridIndex<u32> {
    let mut grid = GridIndex::new(GridConfig::default()).unwrap();
    for p in points {
        grid.insert(*p).unwrap();
    }
    grid
}

fn build_flat(points: &[Positioned<u32>]) -> FlatIndex<u32> {
    let mut flat = FlatIndex::new();
    for p in points {
        flat.insert(*p).unwrap();
    }
    flat
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 10_000, 100_000] {
        let points = gen_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("Grid", n), |b| {
            b.iter_batched(
                || points.clone(),
                |points| black_box(build_grid(&points)),
                BatchSize::LargeInput,
            );
        });
        group.bench_function(BenchmarkId::new("Flat", n), |b| {
            b.iter_batched(
                || points.clone(),
                |points| black_box(build_flat(&points)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn run_queries<S: SpatialQuery<u32>>(index: &S, windows: &[Rect]) -> usize {
    let mut hits = 0;
    for w in windows {
        index.visit_rect(*w, |_| hits += 1);
    }
    hits
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_window");
    let windows = gen_windows(64);
    for &n in &[1_000usize, 10_000, 100_000] {
        let points = gen_points(n);
        let grid = build_grid(&points);
        let flat = build_flat(&points);
        group.throughput(Throughput::Elements(windows.len() as u64));
        group.bench_function(BenchmarkId::new("Grid", n), |b| {
            b.iter(|| black_box(run_queries(&grid, &windows)));
        });
        group.bench_function(BenchmarkId::new("Flat", n), |b| {
            b.iter(|| black_box(run_queries(&flat, &windows)));
        });
    }
    group.finish();
}

fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("grow_to_world");
    let points = gen_points(10_000);
    group.bench_function("ensure_capacity", |b| {
        b.iter_batched(
            || {
                let mut grid = GridIndex::new(GridConfig::default()).unwrap();
                for p in points.iter().filter(|p| p.x <= 1000.0 && p.y <= 1000.0) {
                    grid.insert(*p).unwrap();
                }
                grid
            },
            |mut grid| {
                black_box(grid.ensure_capacity(WORLD, WORLD));
                grid
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_growth);
criterion_main!(benches);
