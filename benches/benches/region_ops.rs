// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use elvira_region::{Aabb, RectRegion, Region};

fn gen_grid_rects(n: i32, cell: i32, gap: i32) -> Vec<Aabb> {
    let mut out = Vec::with_capacity((n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            out.push(Aabb::from_xywh(x * (cell + gap), y * (cell + gap), cell, cell));
        }
    }
    out
}

fn gen_overlap_rects(n: i32, cell: i32) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n as usize);
    for i in 0..n {
        out.push(Aabb::from_xywh(i * cell / 3, i * cell / 4, cell, cell));
    }
    out
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("union");
    for &n in &[4, 8, 16] {
        let rects = gen_grid_rects(n, 20, 5);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("disjoint_grid_n{}", n), |b| {
            b.iter(|| black_box(rects.iter().copied().collect::<RectRegion>()));
        });
    }
    let rects = gen_overlap_rects(32, 60);
    group.bench_function("overlapping_chain_32", |b| {
        b.iter(|| black_box(rects.iter().copied().collect::<RectRegion>()));
    });
    group.finish();
}

fn bench_subtract(c: &mut Criterion) {
    let mut group = c.benchmark_group("subtract");
    let holes = gen_grid_rects(8, 20, 5);
    group.bench_function("punch_holes_8x8", |b| {
        b.iter_batched(
            || RectRegion::from_rect(Aabb::from_xywh(0, 0, 200, 200)),
            |mut r| {
                for h in &holes {
                    r.subtract_rect(*h);
                }
                black_box(r)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale");
    let base: RectRegion = gen_grid_rects(8, 20, 5).into_iter().collect();
    for factor in [2.0, 1.5, 1.25] {
        group.bench_function(format!("grid_8x8_x{}", factor), |b| {
            b.iter_batched(
                || base.clone(),
                |mut r| {
                    r.scale(factor, true);
                    black_box(r)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_union, bench_subtract, bench_scale);
criterion_main!(benches);
