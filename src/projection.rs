//! Perspective projection parameters.
//!
//! [`Projection`] keeps the field of view, aspect ratio and clip distances
//! together. It builds the reverse-Z matrix and converts between view
//! distance and the depth values that end up in the depth buffer.

use crate::math::Mat4;

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Vertical field of view in radians.
    fov_y: f32,
    aspect_ratio: f32,
    z_near: f32,
    /// `f32::INFINITY` selects the infinite-far projection.
    z_far: f32,
}

impl Projection {
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near plane distance (must be > 0)
    /// * `z_far` - Far plane distance, greater than `z_near` or infinite
    pub fn new(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y,
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    pub fn from_degrees(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self::new(fov_y_degrees.to_radians(), aspect_ratio, z_near, z_far)
    }

    /// Projection without a far plane; depth approaches 0 at infinity.
    pub fn infinite(fov_y: f32, aspect_ratio: f32, z_near: f32) -> Self {
        Self::new(fov_y, aspect_ratio, z_near, f32::INFINITY)
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// The reverse-Z projection matrix: near maps to depth 1, far to 0.
    pub fn matrix(&self) -> Mat4 {
        if self.z_far.is_finite() {
            Mat4::perspective(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
        } else {
            Mat4::perspective_infinite(self.fov_y, self.aspect_ratio, self.z_near)
        }
    }

    /// Depth-buffer value of a point `distance` units in front of the eye.
    pub fn depth_at(&self, distance: f32) -> f32 {
        let (n, f) = (self.z_near, self.z_far);
        if f.is_finite() {
            n * (f - distance) / (distance * (f - n))
        } else {
            n / distance
        }
    }

    /// View distance of a stored depth value. `0.0` (nothing drawn) maps to
    /// the far plane.
    pub fn distance_at(&self, depth: f32) -> f32 {
        let (n, f) = (self.z_near, self.z_far);
        if f.is_finite() {
            n * f / (depth * (f - n) + n)
        } else {
            n / depth
        }
    }
}
