// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surface seam.
//!
//! [`Canvas`] is what the draw traversal and node hooks talk to. The host implements it
//! on top of its sprite batch; [`RecordingCanvas`] is a reference implementation that
//! records [`DrawCommand`]s with the transform in effect at each call.
//!
//! Transform state is a current [`Affine`] plus a bounded save stack. Prefer
//! [`TransformScope`] over calling [`Canvas::push_transform`] and
//! [`Canvas::pop_transform`] by hand: the guard pops on every exit path.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use kurbo::{Affine, Line, Point, Rect};

use crate::error::{SceneError, SceneResult};
use crate::types::{AssetHandle, Color};

/// Default depth of a canvas transform stack.
pub const DEFAULT_TRANSFORM_STACK_LIMIT: usize = 64;

/// A drawing surface with a transform stack.
///
/// Composition follows kurbo (`a * b` applies `b` first).
pub trait Canvas {
    /// The transform currently applied to draw calls.
    fn transform(&self) -> Affine;

    /// Save the current transform.
    fn push_transform(&mut self) -> SceneResult<()>;

    /// Restore the most recently saved transform.
    fn pop_transform(&mut self) -> SceneResult<()>;

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Compose `transform` after the current one: `current = transform * current`.
    fn apply_transform(&mut self, transform: Affine);

    /// Compose `transform` before the current one: `current = current * transform`.
    ///
    /// This is how a node's local transform is entered during traversal.
    fn apply_transform_before(&mut self, transform: Affine);

    /// Draw a sprite centered at `at`.
    fn draw_sprite(&mut self, at: Point, sprite: AssetHandle, tint: Color);

    /// Stroke a line.
    fn draw_line(&mut self, line: Line, width: f64, color: Color);

    /// Fill a rectangle.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Draw text with its top-left corner at `at`.
    fn draw_text(&mut self, at: Point, font: AssetHandle, text: &str, color: Color);
}

/// Scoped transform: pushes on creation, pops on drop.
///
/// Dereferences to the canvas, so drawing inside the scope goes through the guard.
///
/// ```
/// use kurbo::{Affine, Point, Vec2};
/// use understory_scene::{AssetHandle, Canvas, Color, RecordingCanvas, TransformScope};
///
/// let mut canvas = RecordingCanvas::new();
/// {
///     let mut scope =
///         TransformScope::apply(&mut canvas, Affine::translate(Vec2::new(5.0, 0.0))).unwrap();
///     scope.draw_sprite(Point::ZERO, AssetHandle(1), Color::WHITE);
/// }
/// assert_eq!(canvas.transform(), Affine::IDENTITY);
/// assert_eq!(canvas.commands()[0].transform(), Affine::translate(Vec2::new(5.0, 0.0)));
/// ```
pub struct TransformScope<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<C: Canvas + ?Sized> core::fmt::Debug for TransformScope<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransformScope")
            .field("transform", &self.canvas.transform())
            .finish_non_exhaustive()
    }
}

impl<'a, C: Canvas + ?Sized> TransformScope<'a, C> {
    /// Push, then compose `transform` before the current transform.
    pub fn apply(canvas: &'a mut C, transform: Affine) -> SceneResult<Self> {
        canvas.push_transform()?;
        canvas.apply_transform_before(transform);
        Ok(Self { canvas })
    }

    /// Push, then replace the current transform with `transform`.
    pub fn replace(canvas: &'a mut C, transform: Affine) -> SceneResult<Self> {
        canvas.push_transform()?;
        canvas.set_transform(transform);
        Ok(Self { canvas })
    }
}

impl<C: Canvas + ?Sized> Deref for TransformScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> DerefMut for TransformScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> Drop for TransformScope<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.canvas.pop_transform() {
            tracing::warn!(error = %err, "transform scope failed to restore canvas");
        }
    }
}

/// A draw call captured by [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`Canvas::draw_sprite`].
    Sprite {
        /// Transform in effect.
        transform: Affine,
        /// Sprite center in local space.
        at: Point,
        /// Sprite asset.
        sprite: AssetHandle,
        /// Tint.
        tint: Color,
    },
    /// [`Canvas::draw_line`].
    Line {
        /// Transform in effect.
        transform: Affine,
        /// Line in local space.
        line: Line,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Color,
    },
    /// [`Canvas::draw_rect`].
    Rect {
        /// Transform in effect.
        transform: Affine,
        /// Rectangle in local space.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::draw_text`].
    Text {
        /// Transform in effect.
        transform: Affine,
        /// Top-left corner in local space.
        at: Point,
        /// Font asset.
        font: AssetHandle,
        /// Text to draw.
        text: String,
        /// Text color.
        color: Color,
    },
}

impl DrawCommand {
    /// Transform that was in effect when the command was recorded.
    pub fn transform(&self) -> Affine {
        match self {
            Self::Sprite { transform, .. }
            | Self::Line { transform, .. }
            | Self::Rect { transform, .. }
            | Self::Text { transform, .. } => *transform,
        }
    }

    /// Local anchor of the command mapped through its transform.
    pub fn world_anchor(&self) -> Point {
        let local = match self {
            Self::Sprite { at, .. } | Self::Text { at, .. } => *at,
            Self::Line { line, .. } => line.p0,
            Self::Rect { rect, .. } => rect.origin(),
        };
        self.transform() * local
    }
}

/// A [`Canvas`] that records draw calls instead of rasterizing them.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    transform: Affine,
    stack: Vec<Affine>,
    stack_limit: usize,
    commands: Vec<DrawCommand>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    /// Create a canvas with the default transform stack limit.
    pub fn new() -> Self {
        Self::with_stack_limit(DEFAULT_TRANSFORM_STACK_LIMIT)
    }

    /// Create a canvas whose transform stack holds at most `limit` entries.
    pub fn with_stack_limit(limit: usize) -> Self {
        Self {
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            stack_limit: limit,
            commands: Vec::new(),
        }
    }

    /// Recorded commands, in call order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the list empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        core::mem::take(&mut self.commands)
    }

    /// Current depth of the transform stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop recorded commands and reset the transform state.
    pub fn clear(&mut self) {
        self.transform = Affine::IDENTITY;
        self.stack.clear();
        self.commands.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn transform(&self) -> Affine {
        self.transform
    }

    fn push_transform(&mut self) -> SceneResult<()> {
        if self.stack.len() >= self.stack_limit {
            return Err(SceneError::TransformStackOverflow {
                limit: self.stack_limit,
            });
        }
        self.stack.push(self.transform);
        Ok(())
    }

    fn pop_transform(&mut self) -> SceneResult<()> {
        self.transform = self.stack.pop().ok_or(SceneError::InvalidOperation(
            "can't pop: transform stack is empty",
        ))?;
        Ok(())
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn apply_transform(&mut self, transform: Affine) {
        self.transform = transform * self.transform;
    }

    fn apply_transform_before(&mut self, transform: Affine) {
        self.transform *= transform;
    }

    fn draw_sprite(&mut self, at: Point, sprite: AssetHandle, tint: Color) {
        self.commands.push(DrawCommand::Sprite {
            transform: self.transform,
            at,
            sprite,
            tint,
        });
    }

    fn draw_line(&mut self, line: Line, width: f64, color: Color) {
        self.commands.push(DrawCommand::Line {
            transform: self.transform,
            line,
            width,
            color,
        });
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect {
            transform: self.transform,
            rect,
            color,
        });
    }

    fn draw_text(&mut self, at: Point, font: AssetHandle, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            transform: self.transform,
            at,
            font,
            text: text.to_string(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    fn shifted(x: f64) -> Affine {
        Affine::translate(Vec2::new(x, 0.0))
    }

    #[test]
    fn apply_before_and_after_differ() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_transform(Affine::scale(2.0));
        canvas.apply_transform_before(shifted(1.0));
        assert_eq!(canvas.transform() * Point::ZERO, Point::new(2.0, 0.0));

        canvas.set_transform(Affine::scale(2.0));
        canvas.apply_transform(shifted(1.0));
        assert_eq!(canvas.transform() * Point::ZERO, Point::new(1.0, 0.0));
    }

    #[test]
    fn scope_pops_on_early_return() {
        fn failing(canvas: &mut RecordingCanvas) -> SceneResult<()> {
            let _scope = TransformScope::apply(canvas, shifted(3.0))?;
            Err(SceneError::InvalidOperation("boom"))
        }
        let mut canvas = RecordingCanvas::new();
        assert!(failing(&mut canvas).is_err());
        assert_eq!(canvas.stack_depth(), 0, "scope must pop on the error path");
        assert_eq!(canvas.transform(), Affine::IDENTITY);
    }

    #[test]
    fn replace_scope_overrides_then_restores() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_transform(shifted(7.0));
        {
            let mut scope = TransformScope::replace(&mut canvas, Affine::IDENTITY).unwrap();
            scope.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK);
        }
        assert_eq!(canvas.commands()[0].transform(), Affine::IDENTITY);
        assert_eq!(canvas.transform(), shifted(7.0));
    }

    #[test]
    fn stack_limit_is_enforced() {
        let mut canvas = RecordingCanvas::with_stack_limit(2);
        canvas.push_transform().unwrap();
        canvas.push_transform().unwrap();
        assert_eq!(
            canvas.push_transform(),
            Err(SceneError::TransformStackOverflow { limit: 2 })
        );
        canvas.pop_transform().unwrap();
        canvas.pop_transform().unwrap();
        assert!(
            matches!(canvas.pop_transform(), Err(SceneError::InvalidOperation(_))),
            "popping an empty stack is rejected"
        );
    }

    #[test]
    fn commands_record_world_anchor() {
        let mut canvas = RecordingCanvas::new();
        canvas.apply_transform_before(shifted(10.0));
        canvas.draw_text(Point::new(1.0, 1.0), AssetHandle(9), "hi", Color::WHITE);
        let cmds = canvas.take_commands();
        assert_eq!(cmds[0].world_anchor(), Point::new(11.0, 1.0));
        assert!(canvas.commands().is_empty());
    }
}
