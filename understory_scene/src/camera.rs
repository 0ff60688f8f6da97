// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2D camera mapping world space onto a screen rectangle.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::{SceneError, SceneResult};

/// Observer fired after every camera change.
pub type CameraObserver = Box<dyn FnMut(&Camera2D)>;

/// A 2D camera.
///
/// The camera looks at `location` (world space) and maps it to the center of its screen
/// rectangle:
///
/// `transform = translate(screen center) * rotate * scale(zoom * aspect, zoom) * translate(-location)`
///
/// Every setter recomputes the transform and then notifies the change observers in
/// registration order.
pub struct Camera2D {
    location: Vec2,
    zoom: f64,
    aspect_ratio: f64,
    rotation: f64,
    screen: Rect,
    transform: Affine,
    observers: Vec<CameraObserver>,
}

impl core::fmt::Debug for Camera2D {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Camera2D")
            .field("location", &self.location)
            .field("zoom", &self.zoom)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("rotation", &self.rotation)
            .field("screen", &self.screen)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Camera2D {
    /// Camera centered on the world origin with unit zoom.
    pub fn new(screen: Rect) -> Self {
        let mut camera = Self {
            location: Vec2::ZERO,
            zoom: 1.0,
            aspect_ratio: 1.0,
            rotation: 0.0,
            screen,
            transform: Affine::IDENTITY,
            observers: Vec::new(),
        };
        camera.transform = camera.compose();
        camera
    }

    /// Register a change observer.
    pub fn on_changed(&mut self, observer: impl FnMut(&Self) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// World point shown at the screen center.
    pub fn location(&self) -> Vec2 {
        self.location
    }

    /// Set the world point shown at the screen center.
    pub fn set_location(&mut self, location: Vec2) {
        self.location = location;
        self.changed();
    }

    /// Zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.changed();
    }

    /// Horizontal stretch relative to the vertical zoom.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Set the horizontal stretch.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        self.aspect_ratio = aspect_ratio;
        self.changed();
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Set the rotation in radians.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.changed();
    }

    /// Screen rectangle the camera renders into.
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Set the screen rectangle.
    pub fn set_screen(&mut self, screen: Rect) {
        self.screen = screen;
        self.changed();
    }

    /// Show all of `world`, preserving proportions.
    pub fn fit_to(&mut self, world: Rect) {
        let h = self.screen.width() / world.width();
        let v = self.screen.height() / world.height();
        self.rotation = 0.0;
        self.zoom = h.min(v);
        self.location = world.center().to_vec2();
        self.changed();
    }

    /// Show exactly `world`, stretching horizontally as needed.
    pub fn stretch_to(&mut self, world: Rect) {
        let h = self.screen.width() / world.width();
        let v = self.screen.height() / world.height();
        self.rotation = 0.0;
        self.zoom = v;
        self.aspect_ratio = h / v;
        self.location = world.center().to_vec2();
        self.changed();
    }

    /// Map a world point to the screen.
    pub fn world_to_screen(&self, pt: Point) -> Point {
        self.transform * pt
    }

    /// Map a screen point back into the world.
    pub fn screen_to_world(&self, pt: Point) -> Point {
        self.transform.inverse() * pt
    }

    /// Map a world rectangle to the screen through its two corners.
    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.world_to_screen(rect.origin()),
            self.world_to_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Pan by a screen-space offset.
    pub fn offset_screen(&mut self, offset: Vec2) {
        let linear = Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.zoom * self.aspect_ratio, self.zoom);
        self.location += (linear.inverse() * offset.to_point()).to_vec2();
        self.changed();
    }

    /// Zoom by `factor`, keeping `world_point` fixed on screen.
    ///
    /// Fails with [`SceneError::ArgumentInvalid`] for a zero or non-finite factor.
    pub fn zoom_at_world_point(&mut self, world_point: Point, factor: f64) -> SceneResult<()> {
        if factor == 0.0 || !factor.is_finite() {
            return Err(SceneError::ArgumentInvalid {
                what: "zoom factor",
                value: factor,
            });
        }
        let to_center = self.location - world_point.to_vec2();
        self.zoom *= factor;
        self.location = world_point.to_vec2() + to_center / factor;
        self.changed();
        Ok(())
    }

    /// Zoom by `factor`, keeping `screen_point` fixed.
    pub fn zoom_at_screen_point(&mut self, screen_point: Point, factor: f64) -> SceneResult<()> {
        self.zoom_at_world_point(self.screen_to_world(screen_point), factor)
    }

    fn compose(&self) -> Affine {
        Affine::translate(self.screen.center().to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.zoom * self.aspect_ratio, self.zoom)
            * Affine::translate(-self.location)
    }

    fn changed(&mut self) {
        self.transform = self.compose();
        let mut observers = core::mem::take(&mut self.observers);
        for observer in &mut observers {
            observer(self);
        }
        self.observers = observers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn location_maps_to_screen_center() {
        let mut cam = Camera2D::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        cam.set_location(Vec2::new(50.0, 50.0));
        assert!(close(
            cam.world_to_screen(Point::new(50.0, 50.0)),
            Point::new(400.0, 300.0)
        ));
        cam.set_zoom(2.0);
        assert!(close(
            cam.world_to_screen(Point::new(60.0, 50.0)),
            Point::new(420.0, 300.0)
        ));
        let back = cam.screen_to_world(Point::new(420.0, 300.0));
        assert!(close(back, Point::new(60.0, 50.0)), "got {back:?}");
    }

    #[test]
    fn fit_to_keeps_world_visible() {
        let mut cam = Camera2D::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        cam.fit_to(Rect::new(0.0, 0.0, 400.0, 100.0));
        assert_eq!(cam.zoom(), 2.0);
        let r = cam.world_rect_to_screen(Rect::new(0.0, 0.0, 400.0, 100.0));
        assert!((r.width() - 800.0).abs() < 1e-9);
        assert!((r.height() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn stretch_to_fills_screen() {
        let mut cam = Camera2D::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        cam.stretch_to(Rect::new(0.0, 0.0, 400.0, 100.0));
        let r = cam.world_rect_to_screen(Rect::new(0.0, 0.0, 400.0, 100.0));
        assert!((r.width() - 800.0).abs() < 1e-9);
        assert!((r.height() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_at_world_point_keeps_point_fixed() {
        let mut cam = Camera2D::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let anchor = Point::new(100.0, -40.0);
        let before = cam.world_to_screen(anchor);
        cam.zoom_at_world_point(anchor, 4.0).unwrap();
        assert!(close(cam.world_to_screen(anchor), before));
        assert!(cam.zoom_at_world_point(anchor, 0.0).is_err());
    }

    #[test]
    fn offset_screen_pans_in_screen_units() {
        let mut cam = Camera2D::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        cam.set_zoom(2.0);
        cam.offset_screen(Vec2::new(20.0, 0.0));
        assert!(close(cam.location().to_point(), Point::new(10.0, 0.0)));
    }

    #[test]
    fn observers_fire_on_every_change() {
        let seen = Rc::new(Cell::new(0_u32));
        let mut cam = Camera2D::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let counter = seen.clone();
        cam.on_changed(move |c| {
            assert!(c.zoom() > 0.0, "observer sees the updated camera");
            counter.set(counter.get() + 1);
        });
        cam.set_zoom(3.0);
        cam.set_rotation(0.5);
        cam.fit_to(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(seen.get(), 3);
    }
}
