// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Director with scene switching.
//!
//! A title scene is shown first. The director script pushes a game scene with a fade
//! effect after one second, and pops it again two seconds later.
//!
//! Run:
//! - `cargo run -p understory_demos --example director_switch`

use kurbo::Rect;
use understory_director::director::Director;
use understory_director::switch::{SwitchEffect, SwitchStatus};
use understory_scene::{
    AssetHandle, AssetRegistry, Canvas, Color, DrawCx, LoadCx, LocalNode, NodeBehavior,
    RecordingCanvas, SceneResult, shared,
};

/// Fades a black rectangle over the screen.
struct Fade {
    screen: Rect,
}

impl SwitchEffect for Fade {
    fn begin(&mut self, status: SwitchStatus) {
        println!("fade begins ({:.2}s)", status.total);
    }

    fn draw(&self, canvas: &mut dyn Canvas, status: SwitchStatus) -> SceneResult<()> {
        let alpha = (255.0 * (1.0 - status.progress.clamp(0.0, 1.0))) as u8;
        canvas.draw_rect(self.screen, Color::BLACK.with_alpha(alpha));
        Ok(())
    }

    fn end(&mut self) {
        println!("fade ends");
    }
}

/// Loads a sprite when its scene is shown and draws it.
#[derive(Default)]
struct Sprite {
    name: &'static str,
    handle: Option<AssetHandle>,
}

impl NodeBehavior for Sprite {
    fn load(&mut self, cx: &mut LoadCx<'_>) -> SceneResult<()> {
        self.handle = Some(cx.load(self.name)?);
        Ok(())
    }

    fn unload(&mut self) {
        self.handle = None;
    }

    fn draw(&self, cx: &mut DrawCx<'_>) -> SceneResult<()> {
        if let Some(handle) = self.handle {
            cx.canvas
                .draw_sprite(kurbo::Point::ZERO, handle, Color::WHITE);
        }
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let screen = Rect::new(0.0, 0.0, 640.0, 480.0);
    let mut assets = AssetRegistry::new();
    assets
        .register("logo", AssetHandle(1))
        .register("hero", AssetHandle(2));
    let mut director = Director::new(shared(assets));

    let mut title = director.new_scene();
    let logo = title.tree_mut().insert_behavior(
        LocalNode::default(),
        Sprite {
            name: "logo",
            ..Default::default()
        },
    );
    title.add(logo).unwrap();
    title.on_activate(|_, _| println!("title active"));
    title.on_deactivate(|_, _| println!("title covered"));
    director.set_scene(title);

    director.script().wait(1.0).invoke(move |cx| {
        let mut game = cx.target.new_scene();
        let hero = game.tree_mut().insert_behavior(
            LocalNode::default(),
            Sprite {
                name: "hero",
                ..Default::default()
            },
        );
        game.add(hero).unwrap();
        game.on_activate(|_, _| println!("game active"));
        cx.target
            .push_scene_with(game, Fade { screen }, 0.5)
            .unwrap();
        cx.target.script().wait(2.0).invoke(|cx| {
            cx.target.pop_scene().unwrap();
        });
    });

    let mut canvas = RecordingCanvas::new();
    for frame in 0..16 {
        canvas.clear();
        director.frame(0.25, &mut canvas).unwrap();
        println!(
            "frame {frame}: depth {} switching {} commands {}",
            director.scene_stack_size(),
            director.is_switching(),
            canvas.commands().len()
        );
    }
}
