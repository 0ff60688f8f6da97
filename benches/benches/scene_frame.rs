// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Vec2};
use understory_scene::{
    Color, DrawCx, LocalNode, NodeBehavior, NodeId, RecordingCanvas, SceneResult, ScriptNode,
    Transform2D, Tree,
};

struct Block;

impl NodeBehavior for Block {
    fn draw(&self, cx: &mut DrawCx<'_>) -> SceneResult<()> {
        cx.canvas
            .draw_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE);
        Ok(())
    }
}

/// A root with `groups` scripted children, each holding `per_group` drawn leaves.
fn build_tree(groups: usize, per_group: usize) -> (Tree, NodeId) {
    let mut tree = Tree::with_snapshot_capacity(groups * (per_group + 1) + 1);
    let root = tree.insert(LocalNode::default());
    for g in 0..groups {
        let group = tree.insert_behavior(
            LocalNode {
                transform: Transform2D::from_location(Vec2::new(g as f64 * 16.0, 0.0)),
                ..Default::default()
            },
            ScriptNode::new(),
        );
        tree.attach(root, group).unwrap();
        tree.timeline_mut(group)
            .unwrap()
            .repeat(1.0e6, move |cx, status| {
                if let Some(t) = cx.target.transform_mut(group) {
                    t.rotation = status.elapsed * 0.1;
                }
            });
        for i in 0..per_group {
            let leaf = tree.insert_behavior(
                LocalNode {
                    transform: Transform2D::from_location(Vec2::new(0.0, i as f64 * 10.0)),
                    ..Default::default()
                },
                Block,
            );
            tree.attach(group, leaf).unwrap();
        }
    }
    (tree, root)
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_update");
    for &(groups, per_group) in &[(8usize, 16usize), (32, 32), (64, 64)] {
        let (mut tree, root) = build_tree(groups, per_group);
        group.throughput(Throughput::Elements((groups * (per_group + 1) + 1) as u64));
        group.bench_function(format!("snapshot_pass_{}x{}", groups, per_group), |b| {
            b.iter(|| {
                tree.update(root, 1.0 / 60.0);
                black_box(tree.len());
            })
        });
    }
    group.finish();
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_draw");
    for &(groups, per_group) in &[(8usize, 16usize), (32, 32), (64, 64)] {
        let (tree, root) = build_tree(groups, per_group);
        let mut canvas = RecordingCanvas::new();
        group.throughput(Throughput::Elements((groups * per_group) as u64));
        group.bench_function(format!("record_{}x{}", groups, per_group), |b| {
            b.iter(|| {
                canvas.clear();
                tree.draw(root, &mut canvas).unwrap();
                black_box(canvas.commands().len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_update, bench_draw);
criterion_main!(benches);
