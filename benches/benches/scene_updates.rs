// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use elvira_scene::{NodeId, OutputDevice, Scene, SceneConfig};

struct Monitor;

impl OutputDevice for Monitor {
    fn resolution(&self) -> (i32, i32) {
        (1920, 1080)
    }
}

struct HiDpi;

impl OutputDevice for HiDpi {
    fn scale(&self) -> f32 {
        1.5
    }
    fn resolution(&self) -> (i32, i32) {
        (2880, 1620)
    }
}

/// An `n × n` grid of overlapping opaque windows on one output.
fn windows_grid(n: i32, config: SceneConfig) -> (Scene, Vec<NodeId>) {
    let mut scene = Scene::with_config(config);
    let _ = scene.create_output(Rc::new(Monitor));
    let root = scene.root();
    let mut ids = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let id = scene.create_rect(root, 120, 90, [0.1, 0.1, 0.1, 1.0]);
            scene.set_position(id, x * 80, y * 60);
            scene.set_enabled(id, true);
            ids.push(id);
        }
    }
    (scene, ids)
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, max: i32) -> i32 {
        (self.next_u64() % max as u64) as i32
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[4, 8, 16] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("enable_grid_n{}", n), |b| {
            b.iter(|| black_box(windows_grid(n, SceneConfig::default())));
        });
    }
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("move");
    for (name, culling) in [("culling", true), ("no_culling", false)] {
        let config = SceneConfig::default().with_calculate_visibility(culling);
        group.bench_function(format!("random_moves_{}", name), |b| {
            b.iter_batched(
                || (windows_grid(8, config), Rng(0x9E37_79B9_7F4A_7C15)),
                |((mut scene, ids), mut rng)| {
                    for _ in 0..64 {
                        let id = ids[rng.below(ids.len() as i32) as usize];
                        scene.set_position(id, rng.below(1800), rng.below(1000));
                    }
                    black_box(scene)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_restack(c: &mut Criterion) {
    let mut group = c.benchmark_group("restack");
    group.bench_function("raise_bottom_window", |b| {
        b.iter_batched(
            || windows_grid(8, SceneConfig::default()),
            |(mut scene, ids)| {
                for _ in 0..16 {
                    let bottom = scene.children(scene.root())[0];
                    scene.move_to_top(bottom);
                }
                black_box((scene, ids))
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    group.bench_function("fractional_scale_damage", |b| {
        b.iter_batched(
            || {
                let (mut scene, ids) = windows_grid(8, SceneConfig::default());
                let out = scene.create_output(Rc::new(HiDpi));
                let _ = scene.commit_output(out);
                (scene, ids, out)
            },
            |(mut scene, ids, out)| {
                for (i, id) in ids.iter().enumerate().step_by(3) {
                    scene.set_position(*id, i as i32 * 7, i as i32 * 5);
                }
                let frame = scene.commit_output(out);
                black_box(scene.damage_for_age(out, Some(2)));
                black_box(frame)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_move, bench_restack, bench_commit);
criterion_main!(benches);
