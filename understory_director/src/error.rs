// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Director errors.

use understory_scene::SceneError;

/// Convenience result type for director operations.
pub type DirectorResult<T> = Result<T, DirectorError>;

/// Errors reported by the [`Director`](crate::director::Director).
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum DirectorError {
    /// The scene stack cannot satisfy the request.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// A parameter is out of range.
    #[error("invalid {what}: {value}")]
    ArgumentInvalid {
        /// Name of the offending parameter.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Loading or drawing a scene failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
}
