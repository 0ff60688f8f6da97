// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frozen pre-order enumeration of a subtree, used to stabilize the update pass.

use alloc::vec::Vec;

use crate::tree::Tree;
use crate::types::NodeId;

/// Default capacity reserved for a snapshot buffer.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 256;

/// Flat list of the nodes reachable from a root, parent before children.
///
/// Captured once per frame before any update hook runs. Nodes attached after capture are
/// not in the list; nodes detached after capture stay in it. The buffer is cleared after
/// each pass and refilled from scratch; only its allocation is reused.
#[derive(Clone, Debug, Default)]
pub struct NodeSnapshot {
    order: Vec<NodeId>,
    stack: Vec<NodeId>,
}

impl NodeSnapshot {
    /// Create an empty snapshot with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            stack: Vec::new(),
        }
    }

    /// Replace the contents with the pre-order walk of `root`'s subtree.
    ///
    /// A stale `root` yields an empty snapshot.
    pub fn capture(&mut self, tree: &Tree, root: NodeId) {
        self.order.clear();
        self.stack.clear();
        if !tree.is_alive(root) {
            return;
        }
        self.stack.push(root);
        while let Some(id) = self.stack.pop() {
            self.order.push(id);
            // Reversed so the first child is visited next.
            self.stack.extend(tree.children(id).iter().rev().copied());
        }
    }

    /// Captured nodes in visit order.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.order
    }

    /// Number of captured nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget the captured nodes, keeping the allocation.
    pub fn clear(&mut self) {
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocalNode;

    #[test]
    fn captures_pre_order() {
        let mut tree = Tree::new();
        let root = tree.insert(LocalNode::default());
        let a = tree.insert(LocalNode::default());
        let a1 = tree.insert(LocalNode::default());
        let b = tree.insert(LocalNode::default());
        tree.attach(root, a).unwrap();
        tree.attach(a, a1).unwrap();
        tree.attach(root, b).unwrap();

        let mut snap = NodeSnapshot::default();
        snap.capture(&tree, root);
        assert_eq!(snap.as_slice(), &[root, a, a1, b]);

        snap.capture(&tree, a);
        assert_eq!(snap.as_slice(), &[a, a1], "capture starts fresh");
    }

    #[test]
    fn stale_root_is_empty() {
        let mut tree = Tree::new();
        let root = tree.insert(LocalNode::default());
        tree.remove(root);
        let mut snap = NodeSnapshot::with_capacity(4);
        snap.capture(&tree, root);
        assert!(snap.is_empty(), "nothing reachable from a removed root");
    }
}
