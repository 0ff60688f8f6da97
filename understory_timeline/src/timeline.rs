// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timeline: an ordered set of independent action chains advanced once per frame.
//!
//! ## Advancement
//!
//! Each [`Timeline::update`] walks the active chains in registration order.
//! For every chain the current action is advanced by `dt`; while it reports
//! completion, the chain moves to its next action and advances that one with the
//! same `dt` in the same call. A chain whose last action completes is removed.
//!
//! ## Ownership
//!
//! Chains are owned by the timeline. The [`ChainId`] returned by the builders is
//! a lookup key only: dropping it never cancels the chain.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::action::{ActionStatus, Completion, TimelineAction};
use crate::error::TimelineResult;

/// Identifier of a chain registered on a [`Timeline`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

/// Context handed to action callbacks.
///
/// `target` is the state the timeline drives (a scene tree, a director, test
/// bookkeeping). [`ActionCx::timeline`] gives access to the timeline that is
/// running the callback, so callbacks can start or extend chains.
pub struct ActionCx<'a, C> {
    /// State driven by the timeline.
    pub target: &'a mut C,
    timeline: &'a mut Timeline<C>,
    chain: ChainId,
}

impl<C> core::fmt::Debug for ActionCx<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionCx")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl<'a, C> ActionCx<'a, C> {
    #[cfg(test)]
    pub(crate) fn detached(target: &'a mut C, timeline: &'a mut Timeline<C>) -> Self {
        Self {
            target,
            timeline,
            chain: ChainId(0),
        }
    }

    /// The timeline running this callback.
    ///
    /// Chains started here join the active set immediately and are advanced
    /// later in the same update pass.
    pub fn timeline(&mut self) -> &mut Timeline<C> {
        self.timeline
    }

    /// The chain the running action belongs to.
    pub fn chain(&self) -> ChainId {
        self.chain
    }
}

struct Chain<C> {
    id: ChainId,
    steps: VecDeque<TimelineAction<C>>,
}

/// Time line controller: stacks (chains) actions and drives their execution.
pub struct Timeline<C> {
    chains: Vec<Chain<C>>,
    next_id: u64,
    // Bumped by `clear` so an in-flight update can notice.
    epoch: u64,
    updating: bool,
}

impl<C> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> core::fmt::Debug for Timeline<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let steps: usize = self.chains.iter().map(|c| c.steps.len()).sum();
        f.debug_struct("Timeline")
            .field("chains", &self.chains.len())
            .field("pending_steps", &steps)
            .finish_non_exhaustive()
    }
}

impl<C> Timeline<C> {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self {
            chains: Vec::new(),
            next_id: 1,
            epoch: 0,
            updating: false,
        }
    }

    /// Number of active chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if no chain is active.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Returns true if the chain has not been exhausted yet.
    pub fn contains(&self, id: ChainId) -> bool {
        self.chains.iter().any(|c| c.id == id)
    }

    /// Drop every active chain.
    ///
    /// Called from inside a callback, this also ends the current update pass.
    pub fn clear(&mut self) {
        self.chains.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Start a new chain whose first step is `action`.
    pub fn start(&mut self, action: TimelineAction<C>) -> ChainBuilder<'_, C> {
        let id = ChainId(self.next_id);
        self.next_id += 1;
        self.chains.push(Chain {
            id,
            steps: VecDeque::new(),
        });
        let index = self.chains.len() - 1;
        tracing::trace!(chain = id.0, "chain started");
        ChainBuilder {
            timeline: self,
            index,
        }
        .checked(action)
    }

    /// Start a chain that waits `seconds` before its next step.
    pub fn wait(&mut self, seconds: f64) -> ChainBuilder<'_, C> {
        self.start(TimelineAction::wait(seconds))
    }

    /// Start a chain that fires `callback` on the next update.
    pub fn invoke(
        &mut self,
        callback: impl FnOnce(&mut ActionCx<'_, C>) + 'static,
    ) -> ChainBuilder<'_, C> {
        self.start(TimelineAction::invoke(callback))
    }

    /// Start a chain that fires `callback` every update for `duration` seconds.
    pub fn repeat(
        &mut self,
        duration: f64,
        callback: impl FnMut(&mut ActionCx<'_, C>, ActionStatus) + 'static,
    ) -> ChainBuilder<'_, C> {
        self.start(TimelineAction::repeat(duration, callback))
    }

    /// Start a chain that fires `callback` every `pulse_period` seconds for `duration` seconds.
    pub fn pulse(
        &mut self,
        duration: f64,
        pulse_period: f64,
        callback: impl FnMut(&mut ActionCx<'_, C>, ActionStatus) + 'static,
    ) -> ChainBuilder<'_, C> {
        self.start(TimelineAction::pulse(duration, pulse_period, callback))
    }

    /// Start a chain that fires `callback` every update until it completes its token.
    pub fn repeat_until(
        &mut self,
        callback: impl FnMut(&mut ActionCx<'_, C>, &mut Completion) + 'static,
    ) -> ChainBuilder<'_, C> {
        self.start(TimelineAction::repeat_until(callback))
    }

    /// Reopen an active chain to append more steps.
    ///
    /// Returns `None` once the chain has been exhausted.
    pub fn extend(&mut self, id: ChainId) -> Option<ChainBuilder<'_, C>> {
        let index = self.chains.iter().position(|c| c.id == id)?;
        Some(ChainBuilder {
            timeline: self,
            index,
        })
    }

    /// Move every chain of `other` to the end of this timeline, leaving `other` empty.
    ///
    /// Moved chains get fresh ids from this timeline; ids handed out by `other` no longer
    /// resolve here.
    pub fn append(&mut self, other: &mut Self) {
        for mut chain in other.chains.drain(..) {
            chain.id = ChainId(self.next_id);
            self.next_id += 1;
            self.chains.push(chain);
        }
    }

    /// Advance every active chain by `dt` seconds.
    ///
    /// Chains are visited in registration order. Chains started by callbacks
    /// during this pass are visited after the existing ones, in the same pass.
    ///
    /// Calling `update` from inside one of this timeline's callbacks does nothing.
    pub fn update(&mut self, dt: f64, target: &mut C) {
        if self.updating {
            tracing::warn!("nested timeline update ignored");
            return;
        }
        self.updating = true;
        self.advance_chains(dt, target);
        self.updating = false;
    }

    fn advance_chains(&mut self, dt: f64, target: &mut C) {
        let mut i = 0;
        while i < self.chains.len() {
            let id = self.chains[i].id;
            let epoch = self.epoch;
            // Detach the steps so callbacks can borrow the timeline.
            let mut steps = core::mem::take(&mut self.chains[i].steps);
            while let Some(current) = steps.front_mut() {
                let complete = {
                    let mut cx = ActionCx {
                        target: &mut *target,
                        timeline: &mut *self,
                        chain: id,
                    };
                    current.advance(dt, &mut cx)
                };
                if self.epoch != epoch {
                    tracing::trace!(chain = id.0, "timeline cleared during update");
                    return;
                }
                // Steps appended through `extend` while this chain was detached.
                steps.append(&mut self.chains[i].steps);
                if !complete {
                    break;
                }
                if let Some(done) = steps.pop_front() {
                    tracing::trace!(chain = id.0, action = done.name(), "action complete");
                }
            }
            if steps.is_empty() {
                self.chains.remove(i);
                tracing::trace!(chain = id.0, "chain exhausted");
            } else {
                self.chains[i].steps = steps;
                i += 1;
            }
        }
    }
}

/// Fluent builder appending steps to one chain.
///
/// Returned by the chain-starting methods on [`Timeline`] and by
/// [`Timeline::extend`]. Each call appends a step and returns the builder.
pub struct ChainBuilder<'a, C> {
    timeline: &'a mut Timeline<C>,
    index: usize,
}

impl<C> core::fmt::Debug for ChainBuilder<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("chain", &self.id())
            .finish_non_exhaustive()
    }
}

impl<C> ChainBuilder<'_, C> {
    /// Identifier of the chain being built.
    pub fn id(&self) -> ChainId {
        self.timeline.chains[self.index].id
    }

    /// Append `action` without validating it.
    pub fn then(self, action: TimelineAction<C>) -> Self {
        self.timeline.chains[self.index].steps.push_back(action);
        self
    }

    /// Append `action` after checking its parameters.
    pub fn try_then(self, action: TimelineAction<C>) -> TimelineResult<Self> {
        action.validate()?;
        Ok(self.then(action))
    }

    /// Append a wait of `seconds`.
    pub fn wait(self, seconds: f64) -> Self {
        self.checked(TimelineAction::wait(seconds))
    }

    /// Append a one-shot callback.
    pub fn invoke(self, callback: impl FnOnce(&mut ActionCx<'_, C>) + 'static) -> Self {
        self.checked(TimelineAction::invoke(callback))
    }

    /// Append a callback fired every update for `duration` seconds.
    pub fn repeat(
        self,
        duration: f64,
        callback: impl FnMut(&mut ActionCx<'_, C>, ActionStatus) + 'static,
    ) -> Self {
        self.checked(TimelineAction::repeat(duration, callback))
    }

    /// Append a callback fired every `pulse_period` seconds for `duration` seconds.
    pub fn pulse(
        self,
        duration: f64,
        pulse_period: f64,
        callback: impl FnMut(&mut ActionCx<'_, C>, ActionStatus) + 'static,
    ) -> Self {
        self.checked(TimelineAction::pulse(duration, pulse_period, callback))
    }

    /// Append a callback fired every update until it completes its token.
    pub fn repeat_until(
        self,
        callback: impl FnMut(&mut ActionCx<'_, C>, &mut Completion) + 'static,
    ) -> Self {
        self.checked(TimelineAction::repeat_until(callback))
    }

    // The fluent surface keeps unchecked parameters; it only reports them.
    fn checked(self, action: TimelineAction<C>) -> Self {
        if let Err(err) = action.validate() {
            tracing::warn!(chain = self.id().0, error = %err, "suspicious timeline action");
        }
        self.then(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    #[test]
    fn wait_consumes_whole_dt() {
        let mut timeline: Timeline<Vec<f64>> = Timeline::new();
        timeline
            .wait(0.5)
            .repeat(10.0, |cx, status| cx.target.push(status.elapsed));
        let mut seen = Vec::new();
        timeline.update(2.0, &mut seen);
        // The repeat starts in the same call and sees the full dt, not 1.5.
        assert_eq!(seen, vec![2.0]);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn wait_then_invoke_in_one_update() {
        let mut timeline: Timeline<u32> = Timeline::new();
        timeline.wait(0.5).invoke(|cx| *cx.target += 1);
        let mut fired = 0;
        timeline.update(2.0, &mut fired);
        assert_eq!(fired, 1);
        assert!(timeline.is_empty(), "exhausted chains are removed");
    }

    #[test]
    fn repeat_reports_event_count_and_progress() {
        let mut timeline: Timeline<Vec<ActionStatus>> = Timeline::new();
        timeline.repeat(1.0, |cx, status| cx.target.push(status));
        let mut seen = Vec::new();
        for step in 0..4 {
            assert_eq!(timeline.len(), 1, "chain alive before step {step}");
            timeline.update(0.3, &mut seen);
        }
        let counts: Vec<u32> = seen.iter().map(|s| s.event_count).collect();
        assert_eq!(counts, vec![0, 1, 2, 3]);
        let last = seen[3];
        assert!(last.elapsed >= 1.0);
        assert!(last.progress > 1.0, "final progress is unclamped");
        assert_eq!(last.clamped_progress(), 1.0);
        assert!(timeline.is_empty(), "repeat completes after its final fire");
    }

    #[test]
    fn chain_survives_dropped_handle() {
        let fired = Rc::new(Cell::new(0_u32));
        let mut timeline: Timeline<()> = Timeline::new();
        {
            let fired = fired.clone();
            let _handle = timeline
                .repeat(1.0, move |_, _| fired.set(fired.get() + 1))
                .id();
        }
        for _ in 0..3 {
            timeline.update(0.1, &mut ());
        }
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn zero_duration_steps_run_in_the_same_frame() {
        let mut timeline: Timeline<Vec<u32>> = Timeline::new();
        timeline
            .invoke(|cx| cx.target.push(1))
            .invoke(|cx| cx.target.push(2))
            .wait(1.0)
            .invoke(|cx| cx.target.push(3));
        let mut log = Vec::new();
        timeline.update(0.016, &mut log);
        assert_eq!(log, vec![1, 2]);
        timeline.update(0.5, &mut log);
        assert_eq!(log, vec![1, 2]);
        timeline.update(0.5, &mut log);
        assert_eq!(log, vec![1, 2, 3]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn chains_advance_in_registration_order() {
        let mut timeline: Timeline<Vec<&'static str>> = Timeline::new();
        timeline.invoke(|cx| cx.target.push("a"));
        timeline.invoke(|cx| cx.target.push("b"));
        timeline.invoke(|cx| cx.target.push("c"));
        let mut log = Vec::new();
        timeline.update(0.0, &mut log);
        assert_eq!(log, vec!["a", "b", "c"]);
    }

    #[test]
    fn chain_started_in_callback_runs_this_pass() {
        let mut timeline: Timeline<Vec<&'static str>> = Timeline::new();
        timeline.invoke(|cx| {
            cx.target.push("outer");
            cx.timeline().invoke(|cx| cx.target.push("inner"));
        });
        let mut log = Vec::new();
        timeline.update(0.0, &mut log);
        assert_eq!(log, vec!["outer", "inner"]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn extend_appends_to_running_chain() {
        let mut timeline: Timeline<Vec<u32>> = Timeline::new();
        let id = timeline.wait(1.0).id();
        timeline
            .extend(id)
            .expect("chain is active")
            .invoke(|cx| cx.target.push(7));
        let mut log = Vec::new();
        timeline.update(1.0, &mut log);
        assert_eq!(log, vec![7]);
        assert!(timeline.extend(id).is_none(), "exhausted chain cannot be extended");
    }

    #[test]
    fn extend_from_own_callback_keeps_chain_alive() {
        let mut timeline: Timeline<Vec<u32>> = Timeline::new();
        timeline.invoke(|cx| {
            cx.target.push(1);
            let id = cx.chain();
            cx.timeline()
                .extend(id)
                .expect("running chain is still registered")
                .invoke(|cx| cx.target.push(2));
        });
        let mut log = Vec::new();
        timeline.update(0.0, &mut log);
        assert_eq!(log, vec![1, 2]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn repeat_until_stalls_without_completion() {
        let mut timeline: Timeline<u32> = Timeline::new();
        timeline.repeat_until(|cx, _done| *cx.target += 1);
        let mut calls = 0;
        for _ in 0..10 {
            timeline.update(1.0, &mut calls);
        }
        assert_eq!(calls, 10);
        assert_eq!(timeline.len(), 1, "an uncompleted repeat-until never finishes");
    }

    #[test]
    fn clear_inside_callback_ends_pass() {
        let mut timeline: Timeline<Vec<u32>> = Timeline::new();
        timeline.invoke(|cx| {
            cx.target.push(1);
            cx.timeline().clear();
        });
        timeline.invoke(|cx| cx.target.push(2));
        let mut log = Vec::new();
        timeline.update(0.0, &mut log);
        assert_eq!(log, vec![1]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn append_moves_chains_in_order() {
        let mut a: Timeline<Vec<u32>> = Timeline::new();
        let mut b: Timeline<Vec<u32>> = Timeline::new();
        a.invoke(|cx| cx.target.push(1));
        b.invoke(|cx| cx.target.push(2));
        b.wait(1.0).invoke(|cx| cx.target.push(3));
        a.append(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.len(), 3);
        let mut log = Vec::new();
        a.update(1.0, &mut log);
        assert_eq!(log, vec![1, 2, 3]);
    }

    #[test]
    fn nested_update_from_callback_is_ignored() {
        let mut timeline: Timeline<u32> = Timeline::new();
        timeline
            .invoke(|cx| {
                let mut other = 0;
                cx.timeline().update(0.0, &mut other);
                *cx.target += 1;
            })
            .invoke(|cx| *cx.target += 10);
        timeline.wait(0.5).invoke(|cx| *cx.target += 100);

        let mut hits = 0;
        timeline.update(0.25, &mut hits);
        assert_eq!(hits, 11, "the outer pass runs to completion");
        assert_eq!(timeline.len(), 1, "only the waiting chain is left");
        timeline.update(0.25, &mut hits);
        assert_eq!(hits, 111);
        assert!(timeline.is_empty());
    }

    #[test]
    fn try_then_rejects_invalid_action() {
        let mut timeline: Timeline<()> = Timeline::new();
        let err = timeline
            .wait(0.1)
            .try_then(TimelineAction::repeat(-1.0, |_, _| {}))
            .expect_err("negative duration is rejected");
        assert!(matches!(
            err,
            crate::TimelineError::ArgumentInvalid {
                what: "repeat duration",
                ..
            }
        ));
        assert_eq!(timeline.len(), 1);
    }
}
