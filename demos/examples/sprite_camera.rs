// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame animation seen through a camera.
//!
//! Plays a looping sprite animation, zooms the camera onto it, and prints where the
//! sprite lands on screen.
//!
//! Run:
//! - `cargo run -p understory_demos --example sprite_camera`

use kurbo::{Point, Rect, Vec2};
use understory_scene::{
    AnimationNode, AssetHandle, Camera2D, DrawCommand, FrameAnimation, LocalNode,
    RecordingCanvas, ScriptNode, Transform2D, Tree,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut camera = Camera2D::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    camera.on_changed(|c| println!("camera zoom {:.2}", c.zoom()));

    let frames = (10..14).map(AssetHandle).collect();
    let mut animation = FrameAnimation::new(frames, 8.0, true).unwrap();
    animation.on_complete(|a| println!("loop complete after {} frames", a.frame_count()));

    let mut tree = Tree::new();
    let root = tree.insert_behavior(LocalNode::default(), ScriptNode::new());
    let runner = tree.insert_behavior(
        LocalNode {
            transform: Transform2D::from_location(Vec2::new(40.0, 30.0)),
            ..Default::default()
        },
        AnimationNode::new(animation),
    );
    tree.attach(root, runner).unwrap();

    // Run along x for a second, then double the animation speed.
    tree.timeline_mut(root)
        .unwrap()
        .repeat(1.0, move |cx, status| {
            if let Some(t) = cx.target.transform_mut(runner) {
                t.location.x = 40.0 + 60.0 * status.clamped_progress();
            }
        })
        .invoke(move |cx| {
            if let Some(node) = cx.target.behavior_mut::<AnimationNode>(runner) {
                node.set_speed(2.0).unwrap();
            }
        });

    camera.fit_to(Rect::new(0.0, 0.0, 200.0, 150.0));
    camera.zoom_at_world_point(Point::new(70.0, 30.0), 1.5).unwrap();

    let mut canvas = RecordingCanvas::new();
    for frame in 0..12 {
        tree.update(root, 1.0 / 6.0);
        canvas.clear();
        tree.draw(root, &mut canvas).unwrap();
        for command in canvas.commands() {
            if let DrawCommand::Sprite { sprite, .. } = command {
                let on_screen = camera.world_to_screen(command.world_anchor());
                println!(
                    "frame {frame}: sprite {} at ({:.0}, {:.0})",
                    sprite.0, on_screen.x, on_screen.y
                );
            }
        }
    }
}
