// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene errors.

use alloc::string::String;

/// Convenience result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors reported by the scene tree, the canvas seam, and node hooks.
///
/// Structural errors are raised before the tree is touched: a rejected mutation leaves
/// the tree exactly as it was.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum SceneError {
    /// The operation is not valid for the current tree or canvas state.
    ///
    /// Raised for cyclic or self attachment, stale node ids, content access on a node
    /// without a content context, and popping an empty canvas transform stack.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// The canvas transform stack is full.
    #[error("transform stack overflow (limit {limit})")]
    TransformStackOverflow {
        /// Maximum stack depth of the canvas.
        limit: usize,
    },
    /// Frame animation parameters out of range.
    #[error("invalid {what}: {value}")]
    ArgumentInvalid {
        /// Name of the offending parameter.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The host failed to load an asset.
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Errors reported by a host [`ContentContext`](crate::ContentContext).
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ContentError {
    /// No asset is registered under this id.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// The asset exists but could not be loaded.
    #[error("failed to load asset {id}: {reason}")]
    Failed {
        /// Asset id passed to `load`.
        id: String,
        /// Host-provided description.
        reason: String,
    },
}
