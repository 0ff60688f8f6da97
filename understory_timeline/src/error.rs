// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported when validating timeline actions.

/// Convenience result type for timeline validation.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors produced by [`TimelineAction::validate`](crate::TimelineAction::validate)
/// and [`ChainBuilder::try_then`](crate::ChainBuilder::try_then).
///
/// Advancing a timeline never fails; only construction parameters are checked.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq)]
pub enum TimelineError {
    /// A construction parameter is out of range (negative, zero where a positive
    /// value is required, or not finite).
    #[error("invalid {what}: {value}")]
    ArgumentInvalid {
        /// Name of the offending parameter.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl TimelineError {
    pub(crate) const fn argument(what: &'static str, value: f64) -> Self {
        Self::ArgumentInvalid { what, value }
    }
}
