// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, content lifecycle, traversals.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::Affine;
use understory_timeline::Timeline;

use crate::behavior::{self, BoxedBehavior, DrawCx, LoadCx, NodeBehavior, NodeCx};
use crate::canvas::{Canvas, TransformScope};
use crate::content::SharedContent;
use crate::error::{SceneError, SceneResult};
use crate::snapshot::{DEFAULT_SNAPSHOT_CAPACITY, NodeSnapshot};
use crate::transform::Transform2D;
use crate::types::{LocalNode, NodeFlags, NodeId};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of scene nodes.
///
/// Nodes are created detached and linked with [`Tree::attach`]. Any node can serve as the
/// root of a traversal; a scene normally keeps one root and attaches everything below it.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    snapshot: NodeSnapshot,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    content: Option<SharedContent>,
    // Taken out while its update hook runs.
    behavior: Option<BoxedBehavior>,
    // Content changed while the behavior was taken out.
    hooks_missed: bool,
}

impl Node {
    fn new(generation: u32, local: LocalNode, behavior: Option<BoxedBehavior>) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            content: None,
            behavior,
            hooks_missed: false,
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::with_snapshot_capacity(DEFAULT_SNAPSHOT_CAPACITY)
    }

    /// Create a tree whose update snapshot reserves room for `capacity` nodes.
    pub fn with_snapshot_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            snapshot: NodeSnapshot::with_capacity(capacity),
        }
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Returns true if the tree holds no live node.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- structure ---

    /// Insert a detached node without behavior.
    pub fn insert(&mut self, local: LocalNode) -> NodeId {
        self.insert_slot(local, None)
    }

    /// Insert a detached node driven by `behavior`.
    pub fn insert_behavior(&mut self, local: LocalNode, behavior: impl NodeBehavior) -> NodeId {
        self.insert_slot(local, Some(Box::new(behavior)))
    }

    fn insert_slot(&mut self, local: LocalNode, behavior: Option<BoxedBehavior>) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local, behavior));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit slot indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local, behavior)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit slot indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Remove a node and its whole subtree from the tree.
    ///
    /// Loaded nodes get their unload hook first. Every removed `NodeId` becomes stale.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.remove_subtree(child);
        }
        self.unload(id);
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Attach `child` as the last (topmost) child of `parent`.
    ///
    /// `child` is detached from its previous parent first, which unloads it. If `parent`
    /// is loaded, every node of `child`'s subtree lacking a content context is then
    /// loaded with `parent`'s context, so a pre-built subtree goes live in one call.
    ///
    /// Fails with [`SceneError::InvalidOperation`] if either id is stale, or if `child` is
    /// `parent` or one of its ancestors; the tree is left untouched in that case.
    /// A content load failure is reported as [`SceneError::Content`] after the structural
    /// change has been made; the failing node stays unloaded.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(SceneError::InvalidOperation("stale node id"));
        }
        if parent == child {
            return Err(SceneError::InvalidOperation(
                "cannot attach a node to itself",
            ));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::InvalidOperation(
                "attach would create a cycle",
            ));
        }
        if let Some(old) = self.node(child).parent {
            self.detach(old, child);
        }
        self.link_parent(child, parent);
        tracing::debug!(?parent, ?child, "attached");
        match self.node(parent).content.clone() {
            Some(content) if self.node(child).content.is_none() => self.load(child, &content),
            _ => Ok(()),
        }
    }

    /// Detach `child` from `parent` and unload it.
    ///
    /// No-op if `child` is not currently a child of `parent`.
    ///
    /// Only `child` itself is unloaded: its descendants keep their content context, unlike
    /// [`Tree::attach`], which loads the whole subtree.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_alive(child) || self.node(child).parent != Some(parent) {
            return;
        }
        self.unlink_parent(child, parent);
        tracing::debug!(?parent, ?child, "detached");
        self.unload(child);
    }

    /// Detach every child of `parent`, in child-list order.
    pub fn detach_all(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        for child in children {
            self.detach(parent, child);
        }
    }

    /// Move `child` to the end of `parent`'s child list so it draws on top.
    ///
    /// No-op if `child` is not a direct child of `parent`.
    pub fn move_to_front(&mut self, parent: NodeId, child: NodeId) {
        let Some(p) = self.node_opt_mut(parent) else {
            return;
        };
        if let Some(pos) = p.children.iter().position(|c| *c == child) {
            let id = p.children.remove(pos);
            p.children.push(id);
        }
    }

    // --- content lifecycle ---

    /// Bind `content` to `root` and every node of its subtree that has none yet, running
    /// their load hooks in pre-order.
    ///
    /// Stops at the first failing hook; that node stays unloaded.
    pub fn load(&mut self, root: NodeId, content: &SharedContent) -> SceneResult<()> {
        if !self.is_alive(root) {
            return Err(SceneError::InvalidOperation("stale node id"));
        }
        let mut stack = Vec::from([root]);
        while let Some(id) = stack.pop() {
            let node = self.node_mut(id);
            stack.extend(node.children.iter().rev().copied());
            if node.content.is_some() {
                continue;
            }
            match node.behavior.as_mut() {
                Some(b) => b.load(&mut LoadCx::new(content, id))?,
                None => node.hooks_missed = true,
            }
            node.content = Some(content.clone());
            tracing::debug!(node = ?id, "loaded");
        }
        Ok(())
    }

    /// Clear `id`'s content context and run its unload hook.
    ///
    /// Descendants are not touched. No-op if the node is not loaded.
    pub fn unload(&mut self, id: NodeId) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.content.take().is_none() {
            return;
        }
        match node.behavior.as_mut() {
            Some(b) => b.unload(),
            None => node.hooks_missed = true,
        }
        tracing::debug!(node = ?id, "unloaded");
    }

    /// Content context bound to `id`, if loaded.
    pub fn content(&self, id: NodeId) -> Option<&SharedContent> {
        self.node_opt(id)?.content.as_ref()
    }

    /// Returns true if `id` is bound to a content context.
    pub fn is_loaded(&self, id: NodeId) -> bool {
        self.content(id).is_some()
    }

    // --- traversals ---

    /// Run one update pass over `root`'s subtree.
    ///
    /// The subtree is captured in pre-order before any hook runs, then every captured node
    /// gets exactly one update call in that order. A node detached by an earlier hook is
    /// still updated this pass; a node attached during the pass waits for the next one.
    /// Nodes removed with [`Tree::remove`] during the pass no longer exist and are skipped.
    pub fn update(&mut self, root: NodeId, dt: f64) {
        debug_assert!(dt >= 0.0, "frame time must be non-negative, got {dt}");
        // Taken out so hooks may run a nested pass.
        let mut snapshot = core::mem::take(&mut self.snapshot);
        snapshot.capture(self, root);
        tracing::trace!(nodes = snapshot.len(), "update pass");
        for &id in snapshot.as_slice() {
            if let Err(err) = self.update_node(id, dt) {
                tracing::warn!(node = ?id, %err, "load failed after update");
            }
        }
        snapshot.clear();
        self.snapshot = snapshot;
    }

    /// Run `id`'s own update hook, without visiting children.
    ///
    /// The behavior is out of its slot while the hook runs. If the hook rebinds the node's
    /// content (for example by attaching the node elsewhere), the missed unload and load
    /// hooks run on the behavior once the hook returns. A failing load is returned and
    /// leaves the node unloaded. If the hook removes the node, a loaded behavior gets its
    /// unload hook before it is dropped.
    pub fn update_node(&mut self, id: NodeId, dt: f64) -> SceneResult<()> {
        let Some(node) = self.node_opt_mut(id) else {
            return Ok(());
        };
        if !node.local.flags.contains(NodeFlags::ACTIVE) {
            return Ok(());
        }
        let Some(mut behavior) = node.behavior.take() else {
            return Ok(());
        };
        let was_loaded = node.content.is_some();
        node.hooks_missed = false;

        behavior.update(&mut NodeCx::new(self, id), dt);

        let Some(node) = self.node_opt_mut(id) else {
            if was_loaded {
                behavior.unload();
            }
            return Ok(());
        };
        let mut result = Ok(());
        if core::mem::take(&mut node.hooks_missed) {
            if was_loaded {
                behavior.unload();
            }
            if let Some(content) = node.content.clone() {
                result = behavior.load(&mut LoadCx::new(&content, id));
                if result.is_err() {
                    node.content = None;
                }
            }
        }
        // A replacement installed by the hook wins.
        if node.behavior.is_none() {
            node.behavior = Some(behavior);
        }
        result
    }

    /// Draw `root`'s subtree onto `canvas`.
    ///
    /// Each visible node enters its local transform with a [`TransformScope`], runs its
    /// draw hook, draws its children in child-list order (later children on top), runs its
    /// foreground hook, and leaves the scope. Invisible nodes are skipped with their
    /// subtree. The canvas transform is restored on every exit path, including errors.
    pub fn draw(&self, root: NodeId, canvas: &mut dyn Canvas) -> SceneResult<()> {
        let Some(node) = self.node_opt(root) else {
            return Err(SceneError::InvalidOperation("stale node id"));
        };
        if !node.local.flags.contains(NodeFlags::VISIBLE) {
            return Ok(());
        }
        let mut scope = TransformScope::apply(canvas, node.local.transform.to_affine())?;
        if let Some(b) = node.behavior.as_deref() {
            b.draw(&mut DrawCx::new(&mut *scope, self, root))?;
        }
        for &child in &node.children {
            self.draw(child, &mut *scope)?;
        }
        if let Some(b) = node.behavior.as_deref() {
            b.draw_foreground(&mut DrawCx::new(&mut *scope, self, root))?;
        }
        Ok(())
    }

    // --- queries ---

    /// Returns true if `id` refers to a live node.
    ///
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Children of `id` in draw order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Local transform of `id`.
    pub fn transform(&self, id: NodeId) -> Option<&Transform2D> {
        Some(&self.node_opt(id)?.local.transform)
    }

    /// Mutable local transform of `id`.
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform2D> {
        Some(&mut self.node_opt_mut(id)?.local.transform)
    }

    /// Replace the local transform of `id`.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform2D) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.transform = transform;
        }
    }

    /// Flags of `id`.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        Some(self.node_opt(id)?.local.flags)
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Composed transform from `id`'s local space to its root's space.
    ///
    /// Evaluated from the current ancestor chain on every call.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        let mut node = self.node_opt(id)?;
        let mut tf = node.local.transform.to_affine();
        while let Some(p) = node.parent {
            node = self.node(p);
            tf = node.local.transform.to_affine() * tf;
        }
        Some(tf)
    }

    /// Behavior of `id` downcast to `T`.
    ///
    /// `None` while the node's own update hook is running.
    pub fn behavior<T: NodeBehavior>(&self, id: NodeId) -> Option<&T> {
        behavior::downcast_ref(self.node_opt(id)?.behavior.as_deref()?)
    }

    /// Mutable behavior of `id` downcast to `T`.
    pub fn behavior_mut<T: NodeBehavior>(&mut self, id: NodeId) -> Option<&mut T> {
        behavior::downcast_mut(self.node_opt_mut(id)?.behavior.as_deref_mut()?)
    }

    /// Replace the behavior of `id`, returning the previous one.
    pub fn set_behavior(
        &mut self,
        id: NodeId,
        behavior: Option<BoxedBehavior>,
    ) -> Option<BoxedBehavior> {
        let node = self.node_opt_mut(id)?;
        core::mem::replace(&mut node.behavior, behavior)
    }

    /// Script timeline of `id`'s behavior, for kinds that own one.
    pub fn timeline_mut(&mut self, id: NodeId) -> Option<&mut Timeline<Self>> {
        self.node_opt_mut(id)?.behavior.as_mut()?.timeline_mut()
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}
