// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-by-frame sprite animation and the node kind that plays it.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Point;
use understory_timeline::Timeline;

use crate::behavior::{DrawCx, NodeBehavior, NodeCx};
use crate::error::{SceneError, SceneResult};
use crate::tree::Tree;
use crate::types::{AssetHandle, Color};

/// Observer fired when an animation passes its last frame.
pub type AnimationObserver = Box<dyn FnMut(&FrameAnimation)>;

/// Sprite animation stepping through a fixed frame list at a fixed rate.
///
/// Each update adds `dt` to the frame clock. Once a full frame duration has accumulated,
/// the animation advances one frame and subtracts one frame duration. Passing the last
/// frame fires the completion observers, then either rewinds to the first frame
/// (repeatable) or pauses on the last one.
pub struct FrameAnimation {
    frames: Vec<AssetHandle>,
    frame_rate: f64,
    frame_duration: f64,
    first_frame: usize,
    current_frame: usize,
    frame_time: f64,
    paused: bool,
    repeatable: bool,
    observers: Vec<AnimationObserver>,
}

impl core::fmt::Debug for FrameAnimation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameAnimation")
            .field("frames", &self.frames.len())
            .field("frame_rate", &self.frame_rate)
            .field("current_frame", &self.current_frame)
            .field("paused", &self.paused)
            .field("repeatable", &self.repeatable)
            .finish_non_exhaustive()
    }
}

fn check_positive(what: &'static str, value: f64) -> SceneResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::ArgumentInvalid { what, value })
    }
}

impl FrameAnimation {
    /// Create an animation over `frames` played at `frame_rate` frames per second.
    pub fn new(frames: Vec<AssetHandle>, frame_rate: f64, repeatable: bool) -> SceneResult<Self> {
        if frames.is_empty() {
            return Err(SceneError::InvalidOperation(
                "frame animation needs at least one frame",
            ));
        }
        check_positive("frame rate", frame_rate)?;
        Ok(Self {
            frames,
            frame_rate,
            frame_duration: 1.0 / frame_rate,
            first_frame: 0,
            current_frame: 0,
            frame_time: 0.0,
            paused: false,
            repeatable,
            observers: Vec::new(),
        })
    }

    /// Register a completion observer.
    pub fn on_complete(&mut self, observer: impl FnMut(&Self) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Advance the frame clock by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        self.frame_time += dt;
        if self.frame_time < self.frame_duration {
            return;
        }
        if self.current_frame + 1 < self.frames.len() {
            self.current_frame += 1;
        } else {
            let mut observers = core::mem::take(&mut self.observers);
            for observer in &mut observers {
                observer(self);
            }
            self.observers = observers;
            if self.repeatable {
                self.current_frame = self.first_frame;
            } else {
                self.paused = true;
            }
        }
        self.frame_time -= self.frame_duration;
    }

    /// Sprite of the current frame.
    pub fn current_sprite(&self) -> AssetHandle {
        self.frames[self.current_frame]
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Set frames per second; resets the frame clock.
    pub fn set_frame_rate(&mut self, frame_rate: f64) -> SceneResult<()> {
        check_positive("frame rate", frame_rate)?;
        self.frame_rate = frame_rate;
        self.frame_duration = 1.0 / frame_rate;
        self.frame_time = 0.0;
        Ok(())
    }

    /// Seconds per frame.
    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    /// Set seconds per frame; resets the frame clock.
    pub fn set_frame_duration(&mut self, frame_duration: f64) -> SceneResult<()> {
        check_positive("frame duration", frame_duration)?;
        self.frame_duration = frame_duration;
        self.frame_rate = 1.0 / frame_duration;
        self.frame_time = 0.0;
        Ok(())
    }

    /// Frame the animation rewinds to.
    pub fn first_frame(&self) -> usize {
        self.first_frame
    }

    /// Set the rewind frame; resets the frame clock.
    pub fn set_first_frame(&mut self, frame: usize) -> SceneResult<()> {
        self.check_frame(frame)?;
        self.first_frame = frame;
        self.frame_time = 0.0;
        Ok(())
    }

    /// Index of the frame being shown.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Jump to `frame`; resets the frame clock.
    pub fn set_current_frame(&mut self, frame: usize) -> SceneResult<()> {
        self.check_frame(frame)?;
        self.current_frame = frame;
        self.frame_time = 0.0;
        Ok(())
    }

    /// Rewind to the first frame and unpause.
    pub fn replay(&mut self) {
        self.current_frame = self.first_frame;
        self.frame_time = 0.0;
        self.paused = false;
    }

    /// Returns true while the frame clock is stopped.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop or restart the frame clock.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Returns true if the animation loops.
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// Choose whether the animation loops.
    pub fn set_repeatable(&mut self, repeatable: bool) {
        self.repeatable = repeatable;
    }

    fn check_frame(&self, frame: usize) -> SceneResult<()> {
        if frame < self.frames.len() {
            Ok(())
        } else {
            Err(SceneError::InvalidOperation("frame index out of range"))
        }
    }
}

/// Node kind playing a [`FrameAnimation`], with its own script timeline.
///
/// Draws the current frame as a sprite centered on the node's local origin.
#[derive(Debug)]
pub struct AnimationNode {
    script: Timeline<Tree>,
    animation: FrameAnimation,
    base_rate: f64,
}

impl AnimationNode {
    /// Wrap `animation`; its current frame rate becomes the base rate for
    /// [`AnimationNode::set_speed`].
    pub fn new(animation: FrameAnimation) -> Self {
        Self {
            script: Timeline::new(),
            base_rate: animation.frame_rate(),
            animation,
        }
    }

    /// The animation being played.
    pub fn animation(&self) -> &FrameAnimation {
        &self.animation
    }

    /// Mutable access to the animation.
    pub fn animation_mut(&mut self) -> &mut FrameAnimation {
        &mut self.animation
    }

    /// Restart from the first frame.
    pub fn replay(&mut self) {
        self.animation.replay();
    }

    /// Stop looping; the animation pauses once it passes its last frame.
    pub fn pause(&mut self) {
        self.animation.set_repeatable(false);
    }

    /// Loop again, restarting from the first frame.
    pub fn resume(&mut self) {
        self.animation.set_repeatable(true);
        self.animation.replay();
    }

    /// Play at `rate` times the base frame rate.
    pub fn set_speed(&mut self, rate: f64) -> SceneResult<()> {
        let frame_rate = rate * self.base_rate;
        if self.animation.frame_rate() != frame_rate {
            self.animation.set_frame_rate(frame_rate)?;
        }
        Ok(())
    }
}

impl NodeBehavior for AnimationNode {
    fn update(&mut self, cx: &mut NodeCx<'_>, dt: f64) {
        self.script.update(dt, cx.tree);
        self.animation.update(dt);
    }

    fn draw(&self, cx: &mut DrawCx<'_>) -> SceneResult<()> {
        cx.canvas
            .draw_sprite(Point::ZERO, self.animation.current_sprite(), Color::WHITE);
        Ok(())
    }

    fn timeline_mut(&mut self) -> Option<&mut Timeline<Tree>> {
        Some(&mut self.script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};
    use crate::types::LocalNode;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    fn frames(n: u64) -> Vec<AssetHandle> {
        (0..n).map(AssetHandle).collect()
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(matches!(
            FrameAnimation::new(Vec::new(), 10.0, true),
            Err(SceneError::InvalidOperation(_))
        ));
        assert!(matches!(
            FrameAnimation::new(frames(2), 0.0, true),
            Err(SceneError::ArgumentInvalid { what: "frame rate", .. })
        ));
    }

    #[test]
    fn repeatable_animation_loops_and_notifies() {
        let completions = Rc::new(Cell::new(0_u32));
        let mut anim = FrameAnimation::new(frames(3), 4.0, true).unwrap();
        let c = completions.clone();
        anim.on_complete(move |_| c.set(c.get() + 1));

        let mut seen = vec![anim.current_frame()];
        for _ in 0..4 {
            anim.update(0.25);
            seen.push(anim.current_frame());
        }
        assert_eq!(seen, vec![0, 1, 2, 0, 1]);
        assert_eq!(completions.get(), 1);
        assert!(!anim.is_paused());
    }

    #[test]
    fn one_shot_animation_pauses_on_last_frame() {
        let mut anim = FrameAnimation::new(frames(2), 2.0, false).unwrap();
        anim.update(0.5);
        assert_eq!(anim.current_frame(), 1);
        anim.update(0.5);
        assert!(anim.is_paused());
        assert_eq!(anim.current_sprite(), AssetHandle(1));
        anim.update(10.0);
        assert_eq!(anim.current_frame(), 1, "paused animation holds its frame");
        anim.replay();
        assert_eq!(anim.current_frame(), 0);
        assert!(!anim.is_paused());
    }

    #[test]
    fn frame_setters_validate() {
        let mut anim = FrameAnimation::new(frames(2), 2.0, false).unwrap();
        assert!(anim.set_current_frame(2).is_err());
        assert!(anim.set_first_frame(1).is_ok());
        assert!(anim.set_frame_duration(-1.0).is_err());
        anim.set_frame_duration(0.25).unwrap();
        assert_eq!(anim.frame_rate(), 4.0);
    }

    #[test]
    fn animation_node_plays_and_draws() {
        let mut tree = Tree::new();
        let anim = FrameAnimation::new(frames(3), 10.0, true).unwrap();
        let id = tree.insert_behavior(LocalNode::default(), AnimationNode::new(anim));

        tree.behavior_mut::<AnimationNode>(id)
            .unwrap()
            .set_speed(2.0)
            .unwrap();
        tree.update(id, 0.05);
        assert_eq!(
            tree.behavior::<AnimationNode>(id)
                .unwrap()
                .animation()
                .current_frame(),
            1,
            "double speed advances after half a base frame"
        );

        let mut canvas = RecordingCanvas::new();
        tree.draw(id, &mut canvas).unwrap();
        assert!(matches!(
            canvas.commands(),
            [DrawCommand::Sprite {
                sprite: AssetHandle(1),
                ..
            }]
        ));

        let node = tree.behavior_mut::<AnimationNode>(id).unwrap();
        node.pause();
        assert!(!node.animation().is_repeatable());
        node.resume();
        assert!(node.animation().is_repeatable());
        assert_eq!(node.animation().current_frame(), 0);
    }
}
