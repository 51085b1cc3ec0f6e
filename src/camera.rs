//! First-person fly camera
//!
//! # Coordinate Systems
//!
//! World space is right-handed with **Z up**:
//! - X: positive right
//! - Y: positive forward
//! - Z: positive up
//!
//! Camera-local space matches the projection and the screen:
//! - X: positive right
//! - Y: positive down
//! - Z: positive forward (into screen)
//!
//! A fixed basis swap `S` takes camera-local axes to the world axes they
//! line up with when yaw and pitch are zero.
//!
//! # Orientation
//!
//! - **Yaw**: rotation around world Z (positive turns left)
//! - **Pitch**: rotation around the camera's right axis (positive looks up)
//!
//! The camera's world transform is `T(position) * Rz(yaw) * Rx(pitch) * S`;
//! the view matrix is its inverse.

use crate::input::{InputEvent, Key, MouseButton};
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::projection::Projection;

/// Pitch is kept strictly inside ±90° so the view never flips.
const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Camera-local (X right, Y down, Z forward) to world (X right, Y forward,
/// Z up).
const BASIS_SWAP: Mat4 = Mat4::from_cols([
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, -1.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.0, 1.0),
]);

/// Mouse-look fly camera driven by [`InputEvent`]s.
///
/// Velocity is stored per camera-local axis, each -1, 0 or +1, and turned
/// into world motion by [`Camera::integrate`].
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    velocity: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    mouse_sensitivity: f32,
    active: bool,
    projection: Projection,
}

impl Camera {
    /// Creates a camera at `position` looking along world +Y.
    ///
    /// `speed` is in world units per second, `mouse_sensitivity` in radians
    /// per pixel per second of frame time.
    pub fn new(position: Vec3, speed: f32, mouse_sensitivity: f32, projection: Projection) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            speed,
            mouse_sensitivity,
            active: false,
            projection,
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Applies one input event.
    ///
    /// Mouse look is on while the left button is held. Pointer motion
    /// turns the camera. Movement keys set one local velocity axis on press
    /// and zero it on release. A resize updates the projection's aspect.
    pub fn handle_input_event(&mut self, event: &InputEvent, dt: f32) {
        match *event {
            InputEvent::MouseButtonDown(MouseButton::Left) => self.active = true,
            InputEvent::MouseButtonUp(MouseButton::Left) => self.active = false,
            InputEvent::MouseMotion { dx, dy } if self.active => {
                self.rotate(
                    -dx * self.mouse_sensitivity * dt,
                    -dy * self.mouse_sensitivity * dt,
                );
            }
            InputEvent::KeyDown(key) => self.set_axis(key, true),
            InputEvent::KeyUp(key) => self.set_axis(key, false),
            InputEvent::Resized { width, height } if width > 0 && height > 0 => {
                self.projection
                    .set_aspect_ratio(width as f32 / height as f32);
            }
            _ => {}
        }
    }

    fn set_axis(&mut self, key: Key, pressed: bool) {
        let value = |v: f32| if pressed { v } else { 0.0 };
        match key {
            Key::W => self.velocity.z = value(1.0),
            Key::S => self.velocity.z = value(-1.0),
            Key::D => self.velocity.x = value(1.0),
            Key::A => self.velocity.x = value(-1.0),
            // Local Y points down.
            Key::Space => self.velocity.y = value(-1.0),
            Key::LeftCtrl => self.velocity.y = value(1.0),
            _ => {}
        }
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    /// Adds yaw and pitch deltas in radians. Pitch is clamped to ±89°.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let limit = PITCH_LIMIT_DEGREES.to_radians();
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-limit, limit);
    }

    /// `Rz(yaw) * Rx(pitch)`.
    pub fn rotation(&self) -> Mat4 {
        Mat4::rotation_z(self.yaw) * Mat4::rotation_x(self.pitch)
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Moves by the current velocity for `dt` seconds.
    pub fn integrate(&mut self, dt: f32) {
        let local = self.velocity * (self.speed * dt);
        let world = (self.rotation() * BASIS_SWAP).transform_vector(local);
        self.position = self.position + world;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Whether mouse look is on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// World-space viewing direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation().transform_vector(Vec3::Y)
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    // =========================================================================
    // Matrix Generation
    // =========================================================================

    /// World to camera-local: inverse of `T(position) * R * S`.
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::translation(self.position) * self.rotation() * BASIS_SWAP).inverse_rigid()
    }

    /// `projection * view * model`.
    pub fn mvp(&self, model: &Mat4) -> Mat4 {
        self.projection.matrix() * self.view_matrix() * *model
    }
}
