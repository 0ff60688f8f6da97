// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds: per-node update, draw, and content hooks.
//!
//! A node carries at most one [`NodeBehavior`]. Every hook has a no-op default, so a kind
//! only implements what it needs. Hooks receive a context instead of `&mut self` access to
//! the tree:
//!
//! - [`NodeCx`] during the update pass. The behavior is taken out of its slot while the hook
//!   runs, so the hook may freely mutate the tree (attach, detach, remove nodes).
//! - [`DrawCx`] during draw. The tree is shared; the canvas is already inside the node's
//!   transform scope.
//! - [`LoadCx`] when the node gains a content context.

use alloc::boxed::Box;
use core::any::Any;

use understory_timeline::Timeline;

use crate::canvas::Canvas;
use crate::content::SharedContent;
use crate::error::{SceneError, SceneResult};
use crate::transform::Transform2D;
use crate::tree::Tree;
use crate::types::{AssetHandle, NodeId};

/// Per-node hooks invoked by the tree traversals.
pub trait NodeBehavior: Any {
    /// Advance this node's own state by `dt` seconds.
    ///
    /// Does not recurse: the snapshot pass visits every node itself.
    fn update(&mut self, cx: &mut NodeCx<'_>, dt: f64) {
        let _ = (cx, dt);
    }

    /// Draw this node under its transform, before its children.
    fn draw(&self, cx: &mut DrawCx<'_>) -> SceneResult<()> {
        let _ = cx;
        Ok(())
    }

    /// Draw overlays after the children, still under this node's transform.
    fn draw_foreground(&self, cx: &mut DrawCx<'_>) -> SceneResult<()> {
        let _ = cx;
        Ok(())
    }

    /// Acquire assets once the node is bound to a content context.
    fn load(&mut self, cx: &mut LoadCx<'_>) -> SceneResult<()> {
        let _ = cx;
        Ok(())
    }

    /// Release assets when the node loses its content context.
    fn unload(&mut self) {}

    /// The script timeline owned by this node, if it has one.
    fn timeline_mut(&mut self) -> Option<&mut Timeline<Tree>> {
        None
    }
}

/// Update-time context.
pub struct NodeCx<'a> {
    /// The tree being updated.
    pub tree: &'a mut Tree,
    node: NodeId,
}

impl core::fmt::Debug for NodeCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeCx")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl<'a> NodeCx<'a> {
    pub(crate) fn new(tree: &'a mut Tree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The node being updated.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Mutable access to this node's local transform.
    ///
    /// `None` once the node has been removed by an earlier hook in the same call.
    pub fn transform_mut(&mut self) -> Option<&mut Transform2D> {
        self.tree.transform_mut(self.node)
    }

    /// Content context bound to this node.
    ///
    /// Fails with [`SceneError::InvalidOperation`] if the node is not loaded.
    pub fn content(&self) -> SceneResult<&SharedContent> {
        self.tree
            .content(self.node)
            .ok_or(SceneError::InvalidOperation("node has no content context"))
    }
}

/// Draw-time context.
pub struct DrawCx<'a> {
    /// Canvas, already inside this node's transform scope.
    pub canvas: &'a mut dyn Canvas,
    tree: &'a Tree,
    node: NodeId,
}

impl core::fmt::Debug for DrawCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawCx")
            .field("node", &self.node)
            .field("transform", &self.canvas.transform())
            .finish_non_exhaustive()
    }
}

impl<'a> DrawCx<'a> {
    pub(crate) fn new(canvas: &'a mut dyn Canvas, tree: &'a Tree, node: NodeId) -> Self {
        Self { canvas, tree, node }
    }

    /// The node being drawn.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The tree being drawn.
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// Content context bound to this node.
    ///
    /// Fails with [`SceneError::InvalidOperation`] if the node was never loaded.
    pub fn content(&self) -> SceneResult<&SharedContent> {
        self.tree
            .content(self.node)
            .ok_or(SceneError::InvalidOperation("node has no content context"))
    }
}

/// Load-time context.
pub struct LoadCx<'a> {
    content: &'a SharedContent,
    node: NodeId,
}

impl core::fmt::Debug for LoadCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadCx")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl<'a> LoadCx<'a> {
    pub(crate) fn new(content: &'a SharedContent, node: NodeId) -> Self {
        Self { content, node }
    }

    /// The node being loaded.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The content context the node is being bound to.
    pub fn content(&self) -> &SharedContent {
        self.content
    }

    /// Load an asset through the node's content context.
    pub fn load(&mut self, id: &str) -> SceneResult<AssetHandle> {
        Ok(self.content.borrow_mut().load(id)?)
    }
}

/// A node that owns a script [`Timeline`] and advances it every update.
///
/// Timeline callbacks receive the whole [`Tree`] as their target, so scripted steps
/// address nodes (including this one) by [`NodeId`].
///
/// ```
/// use kurbo::Vec2;
/// use understory_scene::{LocalNode, ScriptNode, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(LocalNode::default());
/// let x = tree.insert_behavior(LocalNode::default(), ScriptNode::new());
/// tree.attach(root, x).unwrap();
///
/// tree.timeline_mut(x)
///     .unwrap()
///     .wait(0.5)
///     .invoke(move |cx| {
///         if let Some(t) = cx.target.transform_mut(x) {
///             t.location = Vec2::new(100.0, 0.0);
///         }
///     });
///
/// tree.update(root, 0.25);
/// assert_eq!(tree.transform(x).unwrap().location, Vec2::ZERO);
/// tree.update(root, 0.25);
/// assert_eq!(tree.transform(x).unwrap().location, Vec2::new(100.0, 0.0));
/// ```
#[derive(Debug, Default)]
pub struct ScriptNode {
    timeline: Timeline<Tree>,
}

impl ScriptNode {
    /// Create a node with an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The node's timeline.
    pub fn timeline(&self) -> &Timeline<Tree> {
        &self.timeline
    }
}

impl NodeBehavior for ScriptNode {
    fn update(&mut self, cx: &mut NodeCx<'_>, dt: f64) {
        self.timeline.update(dt, cx.tree);
    }

    fn timeline_mut(&mut self) -> Option<&mut Timeline<Tree>> {
        Some(&mut self.timeline)
    }
}

/// Boxed behavior, as stored in the tree.
pub type BoxedBehavior = Box<dyn NodeBehavior>;

pub(crate) fn downcast_ref<T: NodeBehavior>(b: &dyn NodeBehavior) -> Option<&T> {
    let any: &dyn Any = b;
    any.downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: NodeBehavior>(b: &mut dyn NodeBehavior) -> Option<&mut T> {
    let any: &mut dyn Any = b;
    any.downcast_mut::<T>()
}
