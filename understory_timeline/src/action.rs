// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timeline actions: one unit of scheduled work with its own completion predicate.
//!
//! ## Variants
//!
//! - Wait: completes once the remaining time reaches zero or below.
//! - Invoke: fires its callback once and completes in the same update.
//! - Repeat: fires its callback every update (or every pulse period) until the
//!   elapsed time reaches the duration. A repeat with a positive pulse period is
//!   a pulse.
//! - Repeat-until: fires its callback every update with a [`Completion`] token and
//!   completes only once the callback marks the token.
//!
//! Leftover time is never carried into the next action: a wait that overshoots
//! its deadline consumes the whole `dt` of the triggering update.

use alloc::boxed::Box;

use crate::error::{TimelineError, TimelineResult};
use crate::timeline::ActionCx;

/// Callback fired once by an invoke action.
pub type InvokeFn<C> = Box<dyn FnOnce(&mut ActionCx<'_, C>)>;

/// Callback fired by repeat and pulse actions.
pub type RepeatFn<C> = Box<dyn FnMut(&mut ActionCx<'_, C>, ActionStatus)>;

/// Callback fired every update by repeat-until actions.
pub type RepeatUntilFn<C> = Box<dyn FnMut(&mut ActionCx<'_, C>, &mut Completion)>;

/// Status snapshot handed to repeat and pulse callbacks.
///
/// Captured at the moment of firing: `event_count` counts the fires before this
/// one, and `elapsed` already includes the current update's `dt`.
/// `progress` is `elapsed / duration` and is not clamped, so it may exceed `1.0`
/// on the final fire. Clamp at the call site when a bounded range is needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionStatus {
    /// Number of fires before this one.
    pub event_count: u32,
    /// Total duration of the action in seconds.
    pub duration: f64,
    /// Seconds elapsed since the action started.
    pub elapsed: f64,
    /// `elapsed / duration`, unclamped.
    pub progress: f64,
}

impl ActionStatus {
    /// Progress clamped to `0.0..=1.0`.
    pub fn clamped_progress(&self) -> f64 {
        self.progress.clamp(0.0, 1.0)
    }
}

/// Completion token handed to repeat-until callbacks.
///
/// A fresh token is passed on every update. Calling [`Completion::complete`]
/// finishes the action after the callback returns.
#[derive(Debug, Default)]
pub struct Completion {
    done: bool,
}

impl Completion {
    /// Mark the owning action as complete.
    pub fn complete(&mut self) {
        self.done = true;
    }

    /// Returns true once [`Completion::complete`] has been called.
    pub fn is_complete(&self) -> bool {
        self.done
    }
}

struct Repeat<C> {
    duration: f64,
    pulse_period: f64,
    elapsed: f64,
    pulse_elapsed: f64,
    event_count: u32,
    callback: RepeatFn<C>,
}

impl<C> Repeat<C> {
    fn status(&self) -> ActionStatus {
        ActionStatus {
            event_count: self.event_count,
            duration: self.duration,
            elapsed: self.elapsed,
            progress: self.elapsed / self.duration,
        }
    }
}

enum ActionKind<C> {
    Wait {
        remaining: f64,
    },
    Invoke {
        // Taken on first fire.
        callback: Option<InvokeFn<C>>,
    },
    Repeat(Repeat<C>),
    RepeatUntil {
        callback: RepeatUntilFn<C>,
        finished: bool,
    },
}

/// One step of a chain.
///
/// Actions are normally created through the fluent builders on
/// [`Timeline`](crate::Timeline) and [`ChainBuilder`](crate::ChainBuilder);
/// the constructors here are for callers that assemble steps up front.
pub struct TimelineAction<C> {
    kind: ActionKind<C>,
}

impl<C> core::fmt::Debug for TimelineAction<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            ActionKind::Wait { remaining } => f
                .debug_struct("Wait")
                .field("remaining", remaining)
                .finish(),
            ActionKind::Invoke { callback } => f
                .debug_struct("Invoke")
                .field("fired", &callback.is_none())
                .finish(),
            ActionKind::Repeat(r) => f
                .debug_struct("Repeat")
                .field("duration", &r.duration)
                .field("pulse_period", &r.pulse_period)
                .field("elapsed", &r.elapsed)
                .field("event_count", &r.event_count)
                .finish_non_exhaustive(),
            ActionKind::RepeatUntil { finished, .. } => f
                .debug_struct("RepeatUntil")
                .field("finished", finished)
                .finish_non_exhaustive(),
        }
    }
}

impl<C> TimelineAction<C> {
    /// Wait `seconds` before the next step starts.
    pub fn wait(seconds: f64) -> Self {
        Self {
            kind: ActionKind::Wait { remaining: seconds },
        }
    }

    /// Fire `callback` once, then move on within the same update.
    pub fn invoke(callback: impl FnOnce(&mut ActionCx<'_, C>) + 'static) -> Self {
        Self {
            kind: ActionKind::Invoke {
                callback: Some(Box::new(callback)),
            },
        }
    }

    /// Fire `callback` on every update until `duration` seconds have elapsed.
    pub fn repeat(
        duration: f64,
        callback: impl FnMut(&mut ActionCx<'_, C>, ActionStatus) + 'static,
    ) -> Self {
        Self::pulse(duration, 0.0, callback)
    }

    /// Fire `callback` every `pulse_period` seconds until `duration` seconds have elapsed.
    ///
    /// A `pulse_period` of zero or less fires on every update.
    pub fn pulse(
        duration: f64,
        pulse_period: f64,
        callback: impl FnMut(&mut ActionCx<'_, C>, ActionStatus) + 'static,
    ) -> Self {
        Self {
            kind: ActionKind::Repeat(Repeat {
                duration,
                pulse_period,
                elapsed: 0.0,
                pulse_elapsed: 0.0,
                event_count: 0,
                callback: Box::new(callback),
            }),
        }
    }

    /// Fire `callback` on every update until it marks its [`Completion`] token.
    ///
    /// There is no timeout: a callback that never completes stalls its chain.
    pub fn repeat_until(
        callback: impl FnMut(&mut ActionCx<'_, C>, &mut Completion) + 'static,
    ) -> Self {
        Self {
            kind: ActionKind::RepeatUntil {
                callback: Box::new(callback),
                finished: false,
            },
        }
    }

    /// Short name of the action variant, for logs.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            ActionKind::Wait { .. } => "wait",
            ActionKind::Invoke { .. } => "invoke",
            ActionKind::Repeat(r) if r.pulse_period > 0.0 => "pulse",
            ActionKind::Repeat(_) => "repeat",
            ActionKind::RepeatUntil { .. } => "repeat_until",
        }
    }

    /// Check construction parameters.
    ///
    /// Rejects waits that are negative or not finite, repeat durations that are
    /// not strictly positive and finite, and pulse periods that are negative or
    /// not finite.
    pub fn validate(&self) -> TimelineResult<()> {
        match &self.kind {
            ActionKind::Wait { remaining } => {
                if !remaining.is_finite() || *remaining < 0.0 {
                    return Err(TimelineError::argument("wait time", *remaining));
                }
            }
            ActionKind::Repeat(r) => {
                if !r.duration.is_finite() || r.duration <= 0.0 {
                    return Err(TimelineError::argument("repeat duration", r.duration));
                }
                if !r.pulse_period.is_finite() || r.pulse_period < 0.0 {
                    return Err(TimelineError::argument("pulse period", r.pulse_period));
                }
            }
            ActionKind::Invoke { .. } | ActionKind::RepeatUntil { .. } => {}
        }
        Ok(())
    }

    /// Advance by `dt` seconds. Returns true when the action is complete.
    pub(crate) fn advance(&mut self, dt: f64, cx: &mut ActionCx<'_, C>) -> bool {
        match &mut self.kind {
            ActionKind::Wait { remaining } => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            ActionKind::Invoke { callback } => {
                if let Some(callback) = callback.take() {
                    callback(cx);
                }
                true
            }
            ActionKind::Repeat(r) => {
                r.elapsed += dt;
                r.pulse_elapsed += dt;
                if r.pulse_elapsed >= r.pulse_period {
                    if r.pulse_period > 0.0 {
                        r.pulse_elapsed %= r.pulse_period;
                    }
                    let status = r.status();
                    (r.callback)(cx, status);
                    r.event_count += 1;
                }
                r.elapsed >= r.duration
            }
            ActionKind::RepeatUntil { callback, finished } => {
                if !*finished {
                    let mut token = Completion::default();
                    callback(cx, &mut token);
                    *finished = token.is_complete();
                }
                *finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timeline;

    fn advance<C>(action: &mut TimelineAction<C>, dt: f64, target: &mut C) -> bool {
        let mut timeline = Timeline::new();
        let mut cx = ActionCx::detached(target, &mut timeline);
        action.advance(dt, &mut cx)
    }

    #[test]
    fn wait_completes_at_exact_boundary() {
        let mut action = TimelineAction::<()>::wait(0.5);
        assert!(!advance(&mut action, 0.25, &mut ()));
        assert!(advance(&mut action, 0.25, &mut ()), "0.5 - 0.5 <= 0 completes");
    }

    #[test]
    fn invoke_fires_once() {
        let mut action = TimelineAction::<u32>::invoke(|cx| *cx.target += 1);
        let mut count = 0;
        assert!(advance(&mut action, 0.0, &mut count));
        assert!(advance(&mut action, 0.0, &mut count));
        assert_eq!(count, 1, "invoke callback must only fire once");
    }

    #[test]
    fn pulse_wraps_elapsed_pulse_time() {
        let mut fires = 0_u32;
        let mut action = TimelineAction::<u32>::pulse(1.0, 0.25, |cx, _| *cx.target += 1);
        // The third step lands mid-period; its remainder carries into the next pulse.
        for _ in 0..3 {
            advance(&mut action, 0.125, &mut fires);
        }
        assert_eq!(fires, 1);
        for _ in 0..2 {
            advance(&mut action, 0.125, &mut fires);
        }
        assert_eq!(fires, 2, "pulse remainder should carry over");
    }

    #[test]
    fn repeat_until_completes_only_when_token_marked() {
        let mut calls = 0_u32;
        let mut action = TimelineAction::<u32>::repeat_until(|cx, done| {
            *cx.target += 1;
            if *cx.target == 3 {
                done.complete();
            }
        });
        assert!(!advance(&mut action, 10.0, &mut calls));
        assert!(!advance(&mut action, 10.0, &mut calls));
        assert!(advance(&mut action, 0.0, &mut calls));
        assert!(advance(&mut action, 0.0, &mut calls));
        assert_eq!(calls, 3, "a finished repeat-until does not fire again");
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        assert_eq!(
            TimelineAction::<()>::wait(-1.0).validate(),
            Err(TimelineError::ArgumentInvalid {
                what: "wait time",
                value: -1.0
            })
        );
        assert!(TimelineAction::<()>::repeat(0.0, |_, _| {}).validate().is_err());
        assert!(
            TimelineAction::<()>::pulse(1.0, -0.5, |_, _| {})
                .validate()
                .is_err()
        );
        assert!(
            TimelineAction::<()>::repeat(f64::NAN, |_, _| {})
                .validate()
                .is_err()
        );
        assert!(TimelineAction::<()>::wait(0.0).validate().is_ok());
        assert!(TimelineAction::<()>::pulse(2.0, 0.5, |_, _| {}).validate().is_ok());
    }

    #[test]
    fn names_distinguish_pulse_from_repeat() {
        assert_eq!(TimelineAction::<()>::repeat(1.0, |_, _| {}).name(), "repeat");
        assert_eq!(TimelineAction::<()>::pulse(1.0, 0.1, |_, _| {}).name(), "pulse");
        assert_eq!(TimelineAction::<()>::invoke(|_| {}).name(), "invoke");
    }
}
