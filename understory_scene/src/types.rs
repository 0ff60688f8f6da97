// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags, and host handles.

use crate::transform::Transform2D;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable while the node lives but becomes
/// invalid when the node is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On [`Tree::remove`](crate::Tree::remove), the slot is freed; any existing `NodeId`
///   that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Detaching a node from its parent does not invalidate its `NodeId`; detached nodes can be
/// attached elsewhere later.
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to
/// a live node. Stale `NodeId`s never alias a different live node because the generation must
/// match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling traversal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node and its subtree are drawn.
        const VISIBLE = 0b0000_0001;
        /// Node's own update hook runs during the snapshot pass.
        ///
        /// Children are still visited; they carry their own flag.
        const ACTIVE  = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ACTIVE
    }
}

/// Local data for a node.
#[derive(Clone, Debug, Default)]
pub struct LocalNode {
    /// Local transform relative to parent space.
    pub transform: Transform2D,
    /// Visibility and activity flags.
    pub flags: NodeFlags,
}

/// Opaque handle to a host asset (texture, font, sprite frame).
///
/// The scene never interprets the value; it only stores and forwards it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(pub u64);

/// 8-bit RGBA color passed through to the canvas.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque white, the neutral sprite tint.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Build a color from its components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
