// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene switch effects: the timing contract only.
//!
//! A [`SwitchEffect`] is started when a queued scene operation is applied and runs for a
//! fixed duration. [`SwitchEffectPlayer`] owns the clock: `begin` fires once at start,
//! `update` fires every frame while `elapsed < total`, `draw` fires every drawn frame while
//! the player is alive, and `end` fires exactly once when the player finishes or is
//! replaced. What an effect renders is up to the host.

use alloc::boxed::Box;

use understory_scene::{Canvas, SceneResult};

/// Clock state handed to effect hooks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchStatus {
    /// Effect length in seconds.
    pub total: f64,
    /// Seconds since the effect started.
    pub elapsed: f64,
    /// `elapsed / total`.
    pub progress: f64,
}

/// A scene transition effect.
pub trait SwitchEffect {
    /// The effect starts.
    fn begin(&mut self, status: SwitchStatus) {
        let _ = status;
    }

    /// The effect clock advanced by `dt`.
    fn update(&mut self, dt: f64, status: SwitchStatus) {
        let _ = (dt, status);
    }

    /// Draw over the current scene.
    fn draw(&self, canvas: &mut dyn Canvas, status: SwitchStatus) -> SceneResult<()> {
        let _ = (canvas, status);
        Ok(())
    }

    /// The effect is over.
    fn end(&mut self) {}
}

/// Drives one [`SwitchEffect`] for a fixed duration.
pub struct SwitchEffectPlayer {
    effect: Box<dyn SwitchEffect>,
    total: f64,
    elapsed: f64,
}

impl core::fmt::Debug for SwitchEffectPlayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwitchEffectPlayer")
            .field("total", &self.total)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl SwitchEffectPlayer {
    /// Start `effect` for `total` seconds. Fires `begin`.
    pub fn start(mut effect: Box<dyn SwitchEffect>, total: f64) -> Self {
        effect.begin(SwitchStatus {
            total,
            elapsed: 0.0,
            progress: 0.0,
        });
        Self {
            effect,
            total,
            elapsed: 0.0,
        }
    }

    /// Current clock state.
    pub fn status(&self) -> SwitchStatus {
        SwitchStatus {
            total: self.total,
            elapsed: self.elapsed,
            progress: self.elapsed / self.total,
        }
    }

    /// Advance the clock. Returns false once the effect has run its course.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.total {
            let status = self.status();
            self.effect.update(dt, status);
            true
        } else {
            false
        }
    }

    /// Forward to the effect's draw hook.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> SceneResult<()> {
        self.effect.draw(canvas, self.status())
    }

    /// Stop the effect. Fires `end`.
    pub fn finish(mut self) {
        self.effect.end();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use understory_scene::RecordingCanvas;

    /// Effect that logs its hooks into a shared list.
    pub(crate) struct Recorder(pub(crate) Rc<RefCell<Vec<String>>>);

    impl SwitchEffect for Recorder {
        fn begin(&mut self, status: SwitchStatus) {
            self.0.borrow_mut().push(alloc::format!("begin {}", status.total));
        }

        fn update(&mut self, _dt: f64, status: SwitchStatus) {
            self.0
                .borrow_mut()
                .push(alloc::format!("update {}", status.progress));
        }

        fn draw(&self, _canvas: &mut dyn Canvas, status: SwitchStatus) -> SceneResult<()> {
            self.0
                .borrow_mut()
                .push(alloc::format!("draw {}", status.elapsed));
            Ok(())
        }

        fn end(&mut self) {
            self.0.borrow_mut().push("end".into());
        }
    }

    #[test]
    fn player_runs_hooks_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut player = SwitchEffectPlayer::start(Box::new(Recorder(log.clone())), 0.5);
        assert!(player.advance(0.25));
        player.draw(&mut RecordingCanvas::new()).unwrap();
        assert!(!player.advance(0.25), "elapsed == total finishes the effect");
        player.finish();
        assert_eq!(
            *log.borrow(),
            ["begin 0.5", "update 0.5", "draw 0.25", "end"]
        );
    }
}
