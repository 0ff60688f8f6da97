// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scene: one node tree with a scripted root, shown by the director.

use alloc::boxed::Box;
use alloc::vec::Vec;

use understory_scene::{
    Canvas, DEFAULT_SNAPSHOT_CAPACITY, LocalNode, NodeId, SceneResult, ScriptNode, SharedContent,
    Tree,
};
use understory_timeline::Timeline;

/// Observer fired when a scene is activated or deactivated.
///
/// Receives the scene's tree and its root node.
pub type SceneObserver = Box<dyn FnMut(&mut Tree, NodeId)>;

/// A node tree whose root is a [`ScriptNode`].
///
/// The root's timeline is the scene-level script; it advances as part of the scene's update
/// pass like any other node.
pub struct Scene {
    tree: Tree,
    root: NodeId,
    active: bool,
    on_activate: Vec<SceneObserver>,
    on_deactivate: Vec<SceneObserver>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("tree", &self.tree)
            .field("root", &self.root)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::with_snapshot_capacity(DEFAULT_SNAPSHOT_CAPACITY)
    }

    /// Create an empty scene whose update snapshot reserves `capacity` nodes.
    pub fn with_snapshot_capacity(capacity: usize) -> Self {
        let mut tree = Tree::with_snapshot_capacity(capacity);
        let root = tree.insert_behavior(LocalNode::default(), ScriptNode::new());
        Self {
            tree,
            root,
            active: false,
            on_activate: Vec::new(),
            on_deactivate: Vec::new(),
        }
    }

    /// The scene's tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable access to the scene's tree.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Root node of the scene.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Scene-level script timeline.
    ///
    /// `None` while the root's own update hook is running; callbacks scheduled from there
    /// should use the timeline handed to them.
    pub fn script(&mut self) -> Option<&mut Timeline<Tree>> {
        self.tree.timeline_mut(self.root)
    }

    /// Attach `child` under the scene root.
    pub fn add(&mut self, child: NodeId) -> SceneResult<()> {
        self.tree.attach(self.root, child)
    }

    /// Detach `child` from the scene root.
    pub fn remove(&mut self, child: NodeId) {
        self.tree.detach(self.root, child);
    }

    /// Returns true between activation and deactivation.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Register an activation observer.
    pub fn on_activate(&mut self, observer: impl FnMut(&mut Tree, NodeId) + 'static) {
        self.on_activate.push(Box::new(observer));
    }

    /// Register a deactivation observer.
    pub fn on_deactivate(&mut self, observer: impl FnMut(&mut Tree, NodeId) + 'static) {
        self.on_deactivate.push(Box::new(observer));
    }

    /// Run one update pass over the scene.
    pub fn update(&mut self, dt: f64) {
        self.tree.update(self.root, dt);
    }

    /// Draw the scene.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> SceneResult<()> {
        self.tree.draw(self.root, canvas)
    }

    /// Bind `content` to every node of the scene that has none yet.
    pub fn load(&mut self, content: &SharedContent) -> SceneResult<()> {
        self.tree.load(self.root, content)
    }

    /// Release the scene root's content context.
    ///
    /// Only the root is unloaded; descendants keep their context.
    pub fn unload(&mut self) {
        self.tree.unload(self.root);
    }

    /// Returns true if the scene root is bound to a content context.
    pub fn is_loaded(&self) -> bool {
        self.tree.is_loaded(self.root)
    }

    pub(crate) fn activate(&mut self) {
        self.active = true;
        let mut observers = core::mem::take(&mut self.on_activate);
        for observer in &mut observers {
            observer(&mut self.tree, self.root);
        }
        self.on_activate = observers;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        let mut observers = core::mem::take(&mut self.on_deactivate);
        for observer in &mut observers {
            observer(&mut self.tree, self.root);
        }
        self.on_deactivate = observers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn script_runs_with_scene_update() {
        let mut scene = Scene::new();
        let hits = Rc::new(Cell::new(0_u32));
        let h = hits.clone();
        scene
            .script()
            .unwrap()
            .wait(0.1)
            .invoke(move |_| h.set(h.get() + 1));
        scene.update(0.05);
        scene.update(0.05);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn observers_fire_in_registration_order() {
        let mut scene = Scene::new();
        let order = Rc::new(Cell::new(0_u32));
        let (a, b) = (order.clone(), order.clone());
        scene.on_activate(move |_, _| a.set(a.get() * 10 + 1));
        scene.on_activate(move |_, _| b.set(b.get() * 10 + 2));
        scene.activate();
        assert!(scene.is_active());
        assert_eq!(order.get(), 12);
        scene.deactivate();
        assert!(!scene.is_active());
    }
}
