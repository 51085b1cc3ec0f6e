//! Placement of a model in the Z-up world.

use std::f32::consts::{PI, TAU};

use crate::math::{mat4::Mat4, vec3::Vec3};

/// Where a model sits, which way it faces and how large it is.
///
/// Models turn around the world up axis (`heading`) and may lean forward
/// around their own X axis (`tilt`). Setters chain:
///
/// ```ignore
/// model.transform_mut()
///     .set_position(Vec3::new(0.0, 10.0, 0.0))
///     .spin(0.1)
///     .set_scale_uniform(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    /// Radians around world Z, kept in `[-PI, PI)`.
    heading: f32,
    tilt: f32,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
            tilt: 0.0,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Position ============

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position = self.position + delta;
        self
    }

    // ============ Orientation ============

    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Turns the model around the world up axis.
    pub fn spin(&mut self, angle: f32) -> &mut Self {
        self.heading = (self.heading + angle + PI).rem_euclid(TAU) - PI;
        self
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn set_tilt(&mut self, angle: f32) -> &mut Self {
        self.tilt = angle;
        self
    }

    // ============ Scale ============

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::new(s, s, s);
        self
    }

    // ============ Matrix Generation ============

    /// Object to world: `T * Rz(heading) * Rx(tilt) * S`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            * Mat4::rotation_z(self.heading)
            * Mat4::rotation_x(self.tilt)
            * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_places_nothing() {
        assert_eq!(Transform::default().model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn heading_wraps() {
        let mut t = Transform::new();
        t.spin(3.0).spin(1.0);
        assert_relative_eq!(t.heading(), 4.0 - TAU, epsilon = 1e-5);

        t.spin(-TAU);
        assert_relative_eq!(t.heading(), 4.0 - TAU, epsilon = 1e-5);
        assert!((-PI..PI).contains(&t.heading()));
    }

    #[test]
    fn scale_then_turn_then_move() {
        let mut t = Transform::new();
        t.set_position(Vec3::new(0.0, 10.0, 0.0))
            .spin(FRAC_PI_2)
            .set_scale_uniform(2.0);

        // (1, 0, 0) -> scaled (2, 0, 0) -> turned (0, 2, 0) -> moved (0, 12, 0)
        let p = t.model_matrix().transform_point(Vec3::X);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 12.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn tilt_leans_forward_before_heading() {
        let mut t = Transform::new();
        t.set_tilt(FRAC_PI_2).spin(FRAC_PI_2);

        // Up (0, 0, 1) leans onto -Y, then the heading turns -Y onto +X.
        let up = t.model_matrix().transform_vector(Vec3::Z);
        assert_relative_eq!(up.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(up.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(up.z, 0.0, epsilon = 1e-5);
    }
}
