// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Timeline: cooperative, frame-driven action chains.
//!
//! A [`Timeline`] holds independent chains of [`TimelineAction`]s and advances them once per
//! frame. There are no threads or coroutines: an action "blocks" its chain only until the next
//! [`Timeline::update`] call.
//!
//! - Wait: park the chain for a number of seconds.
//! - Invoke: fire a callback once.
//! - Repeat / pulse: fire a callback every update (or every pulse period) for a duration,
//!   reporting an [`ActionStatus`].
//! - Repeat-until: fire a callback every update until it marks its [`Completion`] token.
//!
//! Chains are owned by the timeline. The [`ChainId`] returned when building a chain is a lookup
//! key for [`Timeline::extend`]; dropping it does not cancel anything. A chain is removed exactly
//! when its last action completes.
//!
//! ## Callback context
//!
//! Timelines are generic over a target type `C`. Callbacks receive an [`ActionCx`] holding
//! `&mut C` and access to the running timeline, so scripted steps can mutate the state the
//! timeline drives and schedule further work without shared ownership.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_timeline::Timeline;
//!
//! let mut timeline: Timeline<Vec<&'static str>> = Timeline::new();
//! timeline
//!     .wait(0.5)
//!     .invoke(|cx| cx.target.push("fired"));
//!
//! let mut log = Vec::new();
//! timeline.update(0.25, &mut log);
//! assert!(log.is_empty());
//! timeline.update(0.25, &mut log);
//! assert_eq!(log, ["fired"]);
//! assert!(timeline.is_empty());
//! ```
//!
//! ### Progress reporting
//!
//! ```
//! use understory_timeline::Timeline;
//!
//! let mut timeline: Timeline<f64> = Timeline::new();
//! timeline.repeat(1.0, |cx, status| *cx.target = status.clamped_progress());
//!
//! let mut alpha = 0.0;
//! timeline.update(0.5, &mut alpha);
//! assert_eq!(alpha, 0.5);
//! timeline.update(0.75, &mut alpha);
//! assert_eq!(alpha, 1.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod action;
mod error;
mod timeline;

pub use action::{ActionStatus, Completion, InvokeFn, RepeatFn, RepeatUntilFn, TimelineAction};
pub use error::{TimelineError, TimelineResult};
pub use timeline::{ActionCx, ChainBuilder, ChainId, Timeline};
