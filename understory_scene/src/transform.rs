// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pivoted local transform for scene nodes.
//!
//! A [`Transform2D`] stores its parts by value (location, origin, scale and a bare
//! rotation angle) so they can be animated independently. The composed [`Affine`] is
//! produced on demand by [`Transform2D::to_affine`].
//!
//! ## Composition
//!
//! Applied to a point, the parts run in this order:
//!
//! 1. translate by `-origin`
//! 2. scale
//! 3. rotate (radians, counter-clockwise)
//! 4. translate by `location`
//! 5. translate by `origin`
//!
//! The origin acts as the pivot for rotation and scale. It is not an anchor for
//! translation: a node at `location` with a non-zero origin still ends up with its
//! origin point at `location + origin`.
//!
//! Composition follows kurbo: `a * b` applies `b` first. A node's world transform is
//! `parent_world * local`.

use kurbo::{Affine, Point, Vec2};

/// Local transform parts of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    /// Translation applied after scale and rotation.
    pub location: Vec2,
    /// Pivot for rotation and scale.
    pub origin: Vec2,
    /// Per-axis scale. Defaults to `(1, 1)`.
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        location: Vec2::ZERO,
        origin: Vec2::ZERO,
        scale: Vec2::new(1.0, 1.0),
        rotation: 0.0,
    };

    /// Identity transform translated to `location`.
    pub const fn from_location(location: Vec2) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }

    /// Replace the location.
    #[must_use]
    pub const fn with_location(mut self, location: Vec2) -> Self {
        self.location = location;
        self
    }

    /// Replace the origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Replace the scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the rotation (radians).
    #[must_use]
    pub const fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Compose the parts into a single affine transform.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.origin)
            * Affine::translate(self.location)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.origin)
    }

    /// Map a point from local space into parent space.
    pub fn transform_point(&self, pt: Point) -> Point {
        self.to_affine() * pt
    }
}

impl From<Transform2D> for Affine {
    fn from(t: Transform2D) -> Self {
        t.to_affine()
    }
}
