//! A CPU-only software rasterizer.
//!
//! Meshes are transformed from object space to the screen, scan-converted by
//! one of two interchangeable rasterizers against a reverse-Z depth buffer
//! and composited with 2D overlays, all into a plain byte buffer. SDL2 is
//! used only by the optional `window` feature to show the result.
//!
//! # Quick Start
//!
//! ```ignore
//! use softy::prelude::*;
//!
//! let config = RenderConfig::default();
//! let mut memory = Memory::new(config.permanent_arena_bytes, config.frame_arena_bytes);
//! let mut scene = Scene::new();
//! scene.add(Model::cube(&mut memory.permanent)?);
//!
//! let camera = Camera::new(config.camera_start, 10.0, 0.1, config.projection());
//! let mut pixels = vec![0u8; (config.width * config.height * 4) as usize];
//! let mut frame = Bitmap::new(config.width, config.height, 4, pixels.as_mut_slice())?;
//!
//! memory.reset_frame();
//! Renderer::from_config(&config).render_frame(&mut frame, &camera, &scene, &mut memory)?;
//! ```

// Public API - exposed to library consumers
pub mod bitmap;
pub mod camera;
pub mod colors;
pub mod config;
pub mod error;
pub mod font;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod math;
pub mod memory;
pub mod model;
pub mod projection;
pub mod render;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use bitmap::Bitmap;
pub use camera::Camera;
pub use error::{Error, Result};
pub use model::Model;
pub use projection::Projection;
pub use render::{RasterizerType, Renderer, Scene};
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softy::prelude::*;
/// ```
pub mod prelude {
    // Camera & input
    pub use crate::camera::Camera;
    pub use crate::input::{InputEvent, Key, MouseButton};
    pub use crate::projection::Projection;

    // Assets
    pub use crate::bitmap::Bitmap;
    pub use crate::font::{draw_char, draw_text, Font};
    pub use crate::model::Model;
    pub use crate::transform::Transform;

    // Math & geometry
    pub use crate::geometry::{Aabb, Rect, Triangle, Vertex};
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};

    // Rendering
    pub use crate::render::{
        blit, draw_rect_outline, fill_rect, CullMode, DepthBuffer, RasterizerType, Renderer,
        Scene,
    };

    // Session
    pub use crate::config::RenderConfig;
    pub use crate::error::{Error, Result};
    pub use crate::memory::Memory;
}
