// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_director --heading-base-level=0

//! Understory Director: scene stack orchestration on top of `understory_scene`.
//!
//! ## Overview
//!
//! A [`Director`](crate::director::Director) owns a stack of [`Scene`](crate::scene::Scene)s.
//! The scene on top is the current one; it is the only scene updated and drawn.
//! Each scene is a node tree whose root is a `ScriptNode`, so every scene has its own script
//! timeline. The director has a script of its own, advanced before the current scene.
//!
//! ## Frame flow
//!
//! The host calls [`Director::update`](crate::director::Director::update) with the elapsed
//! seconds, then [`Director::draw`](crate::director::Director::draw) with its canvas, or
//! both at once through [`Director::frame`](crate::director::Director::frame).
//!
//! - Update: director script, then the current scene's update pass, then the running switch
//!   effect.
//! - Draw: queued scene operations are applied, the current scene is drawn from an identity
//!   transform, then the switch effect draws over it.
//!
//! ## Scene switching
//!
//! `set_scene`, `push_scene` and `pop_scene` never change the stack immediately. They queue
//! an operation that the next draw applies, so a script callback can switch scenes while the
//! current scene is still being updated. A newly shown scene is loaded with the director's
//! content context and then activated; the scene it covers or replaces is deactivated.
//!
//! Switches may carry a [`SwitchEffect`](crate::switch::SwitchEffect). The effect only gets a
//! clock ([`SwitchStatus`](crate::switch::SwitchStatus)) and a canvas; rendering the
//! transition is up to the host. Starting an effect while another one runs ends the old one.
//!
//! ## Example
//!
//! ```
//! use understory_director::director::Director;
//! use understory_scene::{AssetRegistry, RecordingCanvas, shared};
//!
//! let mut director = Director::new(shared(AssetRegistry::new()));
//! let title = director.new_scene();
//! director.set_scene(title);
//!
//! // After two seconds, the script shows the next scene.
//! director.script().wait(2.0).invoke(|cx| {
//!     let next = cx.target.new_scene();
//!     cx.target.push_scene(next);
//! });
//!
//! let mut canvas = RecordingCanvas::new();
//! for _ in 0..5 {
//!     director.frame(0.5, &mut canvas).unwrap();
//! }
//! assert_eq!(director.scene_stack_size(), 2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod director;
pub mod error;
pub mod scene;
pub mod switch;
