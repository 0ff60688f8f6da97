// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a Kurbo-native retained 2D scene tree.
//!
//! - Represents a hierarchy of nodes with pivoted local transforms ([`Transform2D`]).
//! - Drives a per-frame update pass over a frozen snapshot of the tree, so update hooks
//!   may attach, detach, and remove nodes while the pass runs.
//! - Draws through a [`Canvas`] seam with scoped transforms that are restored on every
//!   exit path.
//! - Binds a host [`ContentContext`] to whole subtrees as they are attached.
//!
//! ## Frame flow
//!
//! The host calls [`Tree::update`] on the active root with the elapsed seconds, then
//! [`Tree::draw`]. The update pass captures the reachable nodes in pre-order, then gives
//! each captured node exactly one update call. Draw walks the live tree: every node
//! enters its local transform, draws itself, draws its children in child-list order,
//! draws its foreground, and leaves its transform.
//!
//! ## Node kinds
//!
//! Nodes carry an optional [`NodeBehavior`]. The crate ships:
//! - [`ScriptNode`]: owns a [`Timeline`](understory_timeline::Timeline) whose callbacks
//!   drive the tree.
//! - [`AnimationNode`]: plays a [`FrameAnimation`] and has its own script timeline.
//!
//! [`Camera2D`] maps world space onto a screen rectangle for hosts that need one.
//!
//! ## API overview
//!
//! - [`Tree`]: arena of nodes; structure, content lifecycle, traversals, queries.
//! - [`LocalNode`]: per-node local data (transform, flags).
//! - [`NodeFlags`]: visibility and activity controls.
//! - [`NodeId`]: generational handle of a node.
//! - [`NodeSnapshot`]: the frozen pre-order list used by the update pass.
//! - [`RecordingCanvas`]: a [`Canvas`] that records [`DrawCommand`]s.
//!
//! Key operations:
//! - [`Tree::attach`] / [`Tree::detach`] / [`Tree::move_to_front`]
//! - [`Tree::update`] and [`Tree::draw`]
//! - [`Tree::load`] / [`Tree::unload`]
//!
//! ## Content lifecycle
//!
//! Attaching a node under a loaded parent loads the node and every descendant that has no
//! content context yet. Detaching unloads only the detached node; its descendants keep
//! their context, so a branch can be moved elsewhere without reloading.
//!
//! ### Minimal usage
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_scene::{
//!     DrawCommand, LocalNode, RecordingCanvas, ScriptNode, Transform2D, Tree,
//! };
//!
//! let mut tree = Tree::new();
//! let root = tree.insert(LocalNode::default());
//! let mover = tree.insert_behavior(
//!     LocalNode {
//!         transform: Transform2D::from_location(Vec2::new(10.0, 0.0)),
//!         ..Default::default()
//!     },
//!     ScriptNode::new(),
//! );
//! tree.attach(root, mover).unwrap();
//!
//! // Slide right by 10 units per second for one second.
//! tree.timeline_mut(mover).unwrap().repeat(1.0, move |cx, status| {
//!     if let Some(t) = cx.target.transform_mut(mover) {
//!         t.location.x = 10.0 + 10.0 * status.clamped_progress();
//!     }
//! });
//!
//! for _ in 0..4 {
//!     tree.update(root, 0.25);
//! }
//! assert_eq!(tree.transform(mover).unwrap().location, Vec2::new(20.0, 0.0));
//!
//! let world = tree.world_transform(mover).unwrap();
//! assert_eq!(world * Point::ZERO, Point::new(20.0, 0.0));
//!
//! let mut canvas = RecordingCanvas::new();
//! tree.draw(root, &mut canvas).unwrap();
//! assert!(canvas.commands().iter().all(|c| !matches!(c, DrawCommand::Text { .. })));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animation;
mod behavior;
mod camera;
mod canvas;
mod content;
mod error;
mod snapshot;
mod transform;
mod tree;
mod types;

pub use animation::{AnimationNode, AnimationObserver, FrameAnimation};
pub use behavior::{BoxedBehavior, DrawCx, LoadCx, NodeBehavior, NodeCx, ScriptNode};
pub use camera::{Camera2D, CameraObserver};
pub use canvas::{
    Canvas, DEFAULT_TRANSFORM_STACK_LIMIT, DrawCommand, RecordingCanvas, TransformScope,
};
pub use content::{AssetRegistry, ContentContext, SharedContent, shared};
pub use error::{ContentError, SceneError, SceneResult};
pub use snapshot::{DEFAULT_SNAPSHOT_CAPACITY, NodeSnapshot};
pub use transform::Transform2D;
pub use tree::Tree;
pub use types::{AssetHandle, Color, LocalNode, NodeFlags, NodeId};
