// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content context seam: the host's asset loader.
//!
//! The scene holds a [`SharedContent`] per loaded node and forwards it to node hooks.
//! It never interprets asset bytes. A subtree shares one context by reference; only
//! [`Tree::load`](crate::Tree::load) and [`Tree::unload`](crate::Tree::unload) change a
//! node's binding.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::ContentError;
use crate::types::AssetHandle;

/// Host asset loader.
pub trait ContentContext {
    /// Load (or look up) the asset registered under `id`.
    fn load(&mut self, id: &str) -> Result<AssetHandle, ContentError>;

    /// Release every asset loaded through this context.
    ///
    /// Called by the host only. The scene and director crates never call it: unloading a
    /// node or dropping a scene clears bindings and runs node hooks, but a context may be
    /// shared by several scenes, so releasing its assets is the host's decision.
    fn unload(&mut self);
}

/// A content context shared by every node of a loaded subtree.
pub type SharedContent = Rc<RefCell<dyn ContentContext>>;

/// Wrap a content context for sharing across a tree.
pub fn shared(content: impl ContentContext + 'static) -> SharedContent {
    Rc::new(RefCell::new(content))
}

/// In-memory [`ContentContext`] mapping ids to pre-registered handles.
///
/// Useful for tests and for hosts that resolve assets ahead of time.
#[derive(Clone, Debug, Default)]
pub struct AssetRegistry {
    assets: BTreeMap<String, AssetHandle>,
    loaded: Vec<String>,
}

impl AssetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `id`, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, handle: AssetHandle) -> &mut Self {
        self.assets.insert(id.into(), handle);
        self
    }

    /// Ids loaded since the last [`ContentContext::unload`], in load order.
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }
}

impl ContentContext for AssetRegistry {
    fn load(&mut self, id: &str) -> Result<AssetHandle, ContentError> {
        let handle = *self
            .assets
            .get(id)
            .ok_or_else(|| ContentError::NotFound(id.to_string()))?;
        self.loaded.push(id.to_string());
        Ok(handle)
    }

    fn unload(&mut self) {
        self.loaded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_registered_ids() {
        let mut registry = AssetRegistry::new();
        registry
            .register("hero", AssetHandle(1))
            .register("font", AssetHandle(2));
        assert_eq!(registry.load("hero"), Ok(AssetHandle(1)));
        assert_eq!(
            registry.load("missing"),
            Err(ContentError::NotFound("missing".into()))
        );
        assert_eq!(registry.loaded(), ["hero"]);
        registry.unload();
        assert!(registry.loaded().is_empty(), "unload forgets loaded ids");
    }
}
