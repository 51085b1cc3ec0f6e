//! Render configuration.
//!
//! [`RenderConfig::default`] carries the values the demo runs with. A handful
//! of them can be overridden from the environment through
//! [`RenderConfig::from_env`].

use std::path::PathBuf;

use crate::math::Vec3;
use crate::projection::Projection;
use crate::render::{CullMode, RasterizerType};

const MIB: usize = 1024 * 1024;

/// Environment variable selecting the rasterizer (`scanline` or `edge`).
pub const ENV_RASTERIZER: &str = "SOFTY_RASTERIZER";
/// Environment variable naming the OBJ model to load.
pub const ENV_MODEL: &str = "SOFTY_MODEL";
/// Environment variable naming the TTF/OTF font used for the HUD.
pub const ENV_FONT: &str = "SOFTY_FONT";

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub target_fps: u32,

    pub camera_speed: f32,
    pub mouse_sensitivity: f32,
    /// Initial camera position in world space (X right, Y forward, Z up).
    pub camera_start: Vec3,

    pub permanent_arena_bytes: usize,
    pub frame_arena_bytes: usize,

    pub rasterizer: RasterizerType,
    pub cull_mode: CullMode,
    pub clear_color: u32,

    pub model_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov_y_degrees: 70.0,
            z_near: 0.1,
            z_far: 1000.0,
            target_fps: 60,
            camera_speed: 10.0,
            mouse_sensitivity: 0.1,
            camera_start: Vec3::new(0.0, -50.0, 0.0),
            permanent_arena_bytes: 32 * MIB,
            frame_arena_bytes: 4 * MIB,
            rasterizer: RasterizerType::default(),
            cull_mode: CullMode::Ccw,
            clear_color: 0xFF00_0000,
            model_path: None,
            font_path: None,
            font_size: 32.0,
        }
    }
}

impl RenderConfig {
    /// Defaults with overrides from `SOFTY_RASTERIZER`, `SOFTY_MODEL` and
    /// `SOFTY_FONT`.
    ///
    /// Unset variables keep their defaults; an unrecognized rasterizer name
    /// is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var(ENV_RASTERIZER) {
            match name.parse::<RasterizerType>() {
                Ok(rasterizer) => config.rasterizer = rasterizer,
                Err(e) => log::warn!("{ENV_RASTERIZER}: {e}, using {}", config.rasterizer),
            }
        }
        if let Some(path) = std::env::var_os(ENV_MODEL) {
            config.model_path = Some(PathBuf::from(path));
        }
        if let Some(path) = std::env::var_os(ENV_FONT) {
            config.font_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn projection(&self) -> Projection {
        Projection::from_degrees(
            self.fov_y_degrees,
            self.aspect_ratio(),
            self.z_near,
            self.z_far,
        )
    }

    /// Target duration of one frame in seconds.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}
