// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene basics.
//!
//! Build a small tree, script a node with a timeline, run a few frames, and print the
//! recorded draw commands.
//!
//! Run:
//! - `cargo run -p understory_demos --example scene_basics`

use kurbo::{Line, Point, Vec2};
use understory_scene::{
    AssetHandle, Color, DrawCx, LocalNode, NodeBehavior, RecordingCanvas, SceneResult, ScriptNode,
    Transform2D, Tree,
};

struct Marker(&'static str);

impl NodeBehavior for Marker {
    fn draw(&self, cx: &mut DrawCx<'_>) -> SceneResult<()> {
        cx.canvas.draw_line(
            Line::new(Point::new(-4.0, 0.0), Point::new(4.0, 0.0)),
            1.0,
            Color::WHITE,
        );
        cx.canvas
            .draw_text(Point::new(6.0, 0.0), AssetHandle(0), self.0, Color::WHITE);
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut tree = Tree::new();
    let root = tree.insert(LocalNode::default());
    let arm = tree.insert_behavior(
        LocalNode {
            transform: Transform2D::from_location(Vec2::new(100.0, 100.0)),
            ..Default::default()
        },
        ScriptNode::new(),
    );
    let tip = tree.insert_behavior(
        LocalNode {
            transform: Transform2D::from_location(Vec2::new(50.0, 0.0)),
            ..Default::default()
        },
        Marker("tip"),
    );
    tree.attach(root, arm).unwrap();
    tree.attach(arm, tip).unwrap();

    // Swing the arm a quarter turn over one second, then log once.
    tree.timeline_mut(arm)
        .unwrap()
        .repeat(1.0, move |cx, status| {
            if let Some(t) = cx.target.transform_mut(arm) {
                t.rotation = std::f64::consts::FRAC_PI_2 * status.clamped_progress();
            }
        })
        .invoke(|_| println!("swing finished"));

    let mut canvas = RecordingCanvas::new();
    for frame in 0..5 {
        tree.update(root, 0.25);
        canvas.clear();
        tree.draw(root, &mut canvas).unwrap();
        let tip_world = tree.world_transform(tip).unwrap() * Point::ZERO;
        println!("frame {frame}: tip at ({:.1}, {:.1})", tip_world.x, tip_world.y);
    }

    for command in canvas.commands() {
        println!("{:?} at {:?}", command, command.world_anchor());
    }
}
