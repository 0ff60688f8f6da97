// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The director: scene stack, director script, and deferred scene switching.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use kurbo::Affine;
use understory_scene::{Canvas, SharedContent, TransformScope};
use understory_timeline::Timeline;

use crate::config::DirectorConfig;
use crate::error::{DirectorError, DirectorResult};
use crate::scene::Scene;
use crate::switch::{SwitchEffect, SwitchEffectPlayer};

struct EffectRequest {
    effect: Box<dyn SwitchEffect>,
    duration: f64,
}

enum SceneOp {
    Set(Box<Scene>, Option<EffectRequest>),
    Push(Box<Scene>, Option<EffectRequest>),
    Pop(Option<EffectRequest>),
}

impl SceneOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Set(..) => "set",
            Self::Push(..) => "push",
            Self::Pop(..) => "pop",
        }
    }
}

/// Owns the scene stack and drives frames.
///
/// Scene operations ([`Director::set_scene`], [`Director::push_scene`],
/// [`Director::pop_scene`]) are queued and applied at the start of the next
/// [`Director::draw`], in the order they were requested. The top of the stack is the
/// current scene; only it is updated and drawn.
///
/// The director has its own script timeline whose callbacks receive the director itself,
/// so a script can queue scene switches.
pub struct Director {
    config: DirectorConfig,
    stack: Vec<Scene>,
    script: Timeline<Self>,
    pending: VecDeque<SceneOp>,
    player: Option<SwitchEffectPlayer>,
    content: SharedContent,
}

impl core::fmt::Debug for Director {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Director")
            .field("config", &self.config)
            .field("stack", &self.stack.len())
            .field("script", &self.script)
            .field("pending", &self.pending.len())
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

impl Director {
    /// Create a director loading scenes through `content`.
    pub fn new(content: SharedContent) -> Self {
        Self::with_config(content, DirectorConfig::default())
    }

    /// Create a director with an explicit configuration.
    pub fn with_config(content: SharedContent, config: DirectorConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            script: Timeline::new(),
            pending: VecDeque::new(),
            player: None,
            content,
        }
    }

    /// Create an empty scene sized by this director's configuration.
    pub fn new_scene(&self) -> Scene {
        Scene::with_snapshot_capacity(self.config.snapshot_capacity)
    }

    /// Active configuration.
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Content context new scenes are loaded with.
    pub fn content(&self) -> &SharedContent {
        &self.content
    }

    /// The director script.
    ///
    /// While the script runs, this returns an empty stand-in timeline. Chains scheduled on
    /// it from inside a director callback join the script after the current update pass,
    /// but other calls such as [`Timeline::clear`] do not reach the running script; use the
    /// callback's own `cx.timeline()` for those.
    pub fn script(&mut self) -> &mut Timeline<Self> {
        &mut self.script
    }

    /// The scene on top of the stack.
    pub fn current_scene(&self) -> Option<&Scene> {
        self.stack.last()
    }

    /// Mutable access to the scene on top of the stack.
    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        self.stack.last_mut()
    }

    /// Number of scenes on the stack. Queued operations are not counted.
    pub fn scene_stack_size(&self) -> usize {
        self.stack.len()
    }

    /// Returns true while a switch effect is running.
    pub fn is_switching(&self) -> bool {
        self.player.is_some()
    }

    /// Returns true if scene operations are waiting for the next draw.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Replace the current scene.
    pub fn set_scene(&mut self, scene: Scene) {
        self.pending.push_back(SceneOp::Set(Box::new(scene), None));
    }

    /// Replace the current scene, playing `effect` for `duration` seconds.
    pub fn set_scene_with(
        &mut self,
        scene: Scene,
        effect: impl SwitchEffect + 'static,
        duration: f64,
    ) -> DirectorResult<()> {
        let request = self.effect_request(effect, duration)?;
        self.pending
            .push_back(SceneOp::Set(Box::new(scene), Some(request)));
        Ok(())
    }

    /// Show `scene` on top of the current one.
    pub fn push_scene(&mut self, scene: Scene) {
        self.pending.push_back(SceneOp::Push(Box::new(scene), None));
    }

    /// Show `scene` on top of the current one, playing `effect` for `duration` seconds.
    pub fn push_scene_with(
        &mut self,
        scene: Scene,
        effect: impl SwitchEffect + 'static,
        duration: f64,
    ) -> DirectorResult<()> {
        let request = self.effect_request(effect, duration)?;
        self.pending
            .push_back(SceneOp::Push(Box::new(scene), Some(request)));
        Ok(())
    }

    /// Remove the current scene and reactivate the one below it.
    ///
    /// Fails with [`DirectorError::InvalidOperation`] if no scene will be on the stack once
    /// the already queued operations are applied.
    pub fn pop_scene(&mut self) -> DirectorResult<()> {
        self.check_poppable()?;
        self.pending.push_back(SceneOp::Pop(None));
        Ok(())
    }

    /// Like [`Director::pop_scene`], playing `effect` for `duration` seconds.
    pub fn pop_scene_with(
        &mut self,
        effect: impl SwitchEffect + 'static,
        duration: f64,
    ) -> DirectorResult<()> {
        self.check_poppable()?;
        let request = self.effect_request(effect, duration)?;
        self.pending.push_back(SceneOp::Pop(Some(request)));
        Ok(())
    }

    /// Advance one frame: the director script, then the current scene, then the running
    /// switch effect.
    pub fn update(&mut self, dt: f64) {
        let mut script = core::mem::take(&mut self.script);
        script.update(dt, self);
        // Chains scheduled on `self.script` while the real one was out.
        script.append(&mut self.script);
        self.script = script;

        if let Some(scene) = self.stack.last_mut() {
            scene.update(dt);
        }

        if self.player.as_mut().is_some_and(|p| !p.advance(dt)) {
            if let Some(done) = self.player.take() {
                done.finish();
            }
            tracing::debug!("switch effect finished");
        }
    }

    /// Draw one frame.
    ///
    /// Applies queued scene operations, draws the current scene from an identity transform,
    /// then lets the running switch effect draw over it. If showing a scene fails, the
    /// operations queued after it stay pending.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) -> DirectorResult<()> {
        while let Some(op) = self.pending.pop_front() {
            self.apply(op)?;
        }
        if let Some(scene) = self.stack.last() {
            let mut scope = TransformScope::replace(canvas, Affine::IDENTITY)?;
            scene.draw(&mut *scope)?;
        }
        if let Some(player) = &self.player {
            player.draw(canvas)?;
        }
        Ok(())
    }

    /// [`Director::update`] followed by [`Director::draw`].
    pub fn frame(&mut self, dt: f64, canvas: &mut dyn Canvas) -> DirectorResult<()> {
        self.update(dt);
        self.draw(canvas)
    }

    fn effect_request(
        &self,
        effect: impl SwitchEffect + 'static,
        duration: f64,
    ) -> DirectorResult<EffectRequest> {
        if !duration.is_finite() || duration < self.config.min_switch_duration {
            return Err(DirectorError::ArgumentInvalid {
                what: "switch effect duration",
                value: duration,
            });
        }
        Ok(EffectRequest {
            effect: Box::new(effect),
            duration,
        })
    }

    fn check_poppable(&self) -> DirectorResult<()> {
        let available = self.pending.iter().fold(self.stack.len(), |n, op| match op {
            SceneOp::Set(..) => n.max(1),
            SceneOp::Push(..) => n + 1,
            SceneOp::Pop(..) => n.saturating_sub(1),
        });
        if available == 0 {
            Err(DirectorError::InvalidOperation(
                "unable to pop scene: scene stack is empty",
            ))
        } else {
            Ok(())
        }
    }

    fn start_effect(&mut self, request: EffectRequest) {
        if let Some(old) = self.player.take() {
            old.finish();
            tracing::debug!("switch effect replaced");
        }
        tracing::debug!(duration = request.duration, "switch effect started");
        self.player = Some(SwitchEffectPlayer::start(request.effect, request.duration));
    }

    fn apply(&mut self, op: SceneOp) -> DirectorResult<()> {
        tracing::debug!(op = op.name(), depth = self.stack.len(), "applying scene operation");
        match op {
            SceneOp::Set(scene, effect) => {
                if let Some(effect) = effect {
                    self.start_effect(effect);
                }
                if let Some(mut old) = self.stack.pop() {
                    old.deactivate();
                }
                self.show(*scene)
            }
            SceneOp::Push(scene, effect) => {
                if let Some(effect) = effect {
                    self.start_effect(effect);
                }
                if let Some(top) = self.stack.last_mut() {
                    top.deactivate();
                }
                self.show(*scene)
            }
            SceneOp::Pop(effect) => {
                if let Some(mut old) = self.stack.pop() {
                    old.deactivate();
                }
                if let Some(effect) = effect {
                    self.start_effect(effect);
                }
                if let Some(top) = self.stack.last_mut() {
                    top.activate();
                }
                Ok(())
            }
        }
    }

    fn show(&mut self, mut scene: Scene) -> DirectorResult<()> {
        let loaded = scene.load(&self.content);
        scene.activate();
        self.stack.push(scene);
        tracing::debug!(depth = self.stack.len(), "scene shown");
        Ok(loaded?)
    }
}
