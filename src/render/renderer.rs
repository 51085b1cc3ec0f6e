//! Frame entry point.
//!
//! [`Renderer`] holds the per-session render state (active rasterizer, cull
//! mode, clear color) and draws a [`Scene`] into a caller-owned destination
//! bitmap. Nothing here owns pixel memory: the destination is borrowed for
//! the call and the depth plane comes from the frame arena.

use super::depth::DepthBuffer;
use super::framebuffer::FrameBuffer;
use super::rasterizer::{
    CullMode, FlatShader, NormalShader, Rasterizer, RasterizerDispatcher, RasterizerType,
};
use crate::bitmap::Bitmap;
use crate::camera::Camera;
use crate::colors;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::geometry::{project_triangle, Rect, Triangle};
use crate::math::{Vec2, Vec3};
use crate::memory::{ArenaSlice, Memory};
use crate::model::Model;

/// Everything drawn by one [`Renderer::render_frame`] call.
#[derive(Debug, Default)]
pub struct Scene {
    pub models: Vec<Model>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, model: Model) -> &mut Model {
        self.models.push(model);
        let last = self.models.len() - 1;
        &mut self.models[last]
    }
}

/// What the last frame did.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    /// Triangles handed to the rasterizer.
    pub triangles: usize,
    /// Triangles dropped because a corner was at or behind the eye.
    pub behind_eye: usize,
    /// The frame's depth plane, valid until the frame arena is reset.
    pub depth: ArenaSlice<f32>,
}

#[derive(Debug)]
pub struct Renderer {
    rasterizer: RasterizerDispatcher,
    cull_mode: CullMode,
    clear_color: u32,
    shader: NormalShader,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RasterizerType::default(), CullMode::Ccw)
    }
}

impl Renderer {
    pub fn new(rasterizer_type: RasterizerType, cull_mode: CullMode) -> Self {
        Self {
            rasterizer: RasterizerDispatcher::new(rasterizer_type),
            cull_mode,
            clear_color: colors::BLACK,
            shader: NormalShader::default(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        let mut renderer = Self::new(config.rasterizer, config.cull_mode);
        renderer.clear_color = config.clear_color;
        renderer
    }

    // ============ State ============

    pub fn rasterizer_type(&self) -> RasterizerType {
        self.rasterizer.active_type()
    }

    pub fn set_rasterizer_type(&mut self, rasterizer_type: RasterizerType) {
        log::info!("rasterizer: {rasterizer_type}");
        self.rasterizer.set_type(rasterizer_type);
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn set_cull_mode(&mut self, cull_mode: CullMode) {
        self.cull_mode = cull_mode;
    }

    pub fn set_clear_color(&mut self, color: u32) {
        self.clear_color = color;
    }

    // ============ Drawing ============

    /// Clears `destination` and draws every model of `scene` as seen by
    /// `camera`.
    ///
    /// The depth plane is allocated from `memory.frame`; the caller resets
    /// that arena once per frame. Model data is read from
    /// `memory.permanent`.
    ///
    /// # Errors
    /// * [`Error::UnsupportedChannels`] if `destination` is not 4-channel
    /// * [`Error::ArenaExhausted`] if the frame arena cannot hold the depth plane
    /// * [`Error::StaleAllocation`] if a model outlived its arena contents
    ///
    /// [`Error::UnsupportedChannels`]: crate::Error::UnsupportedChannels
    /// [`Error::ArenaExhausted`]: crate::Error::ArenaExhausted
    /// [`Error::StaleAllocation`]: crate::Error::StaleAllocation
    pub fn render_frame(
        &mut self,
        destination: &mut Bitmap<&mut [u8]>,
        camera: &Camera,
        scene: &Scene,
        memory: &mut Memory,
    ) -> Result<FrameStats> {
        destination.require_channels(4)?;
        destination.clear(self.clear_color);

        let (width, height) = (destination.width(), destination.height());
        let Memory { permanent, frame } = memory;

        let depth_handle = frame.alloc::<f32>(destination.pixel_count(), DepthBuffer::FAR)?;
        let depth = DepthBuffer::new(frame.slice_mut(depth_handle)?, width, height)?;
        let mut buffer = FrameBuffer::new(destination.view_mut(), Some(depth))?;

        let mut stats = FrameStats {
            triangles: 0,
            behind_eye: 0,
            depth: depth_handle,
        };

        for model in &scene.models {
            let mvp = camera.mvp(&model.transform().model_matrix());
            let vertices = model.vertices(permanent)?;
            let indices = model.indices(permanent)?;

            for face in indices.chunks_exact(3) {
                let corners = (
                    vertices.get(face[0] as usize),
                    vertices.get(face[1] as usize),
                    vertices.get(face[2] as usize),
                );
                let (Some(v0), Some(v1), Some(v2)) = corners else {
                    continue;
                };

                let triangle = project_triangle(v0, v1, v2, &mvp, width as f32, height as f32);
                if !triangle.inv_w.iter().all(|w| w.is_finite() && *w > 0.0) {
                    stats.behind_eye += 1;
                    continue;
                }

                self.rasterizer
                    .fill_triangle(&triangle, &mut buffer, self.cull_mode, &self.shader);
                stats.triangles += 1;
            }
        }

        log::trace!(
            "frame: {} models, {} triangles, {} behind eye, {} rasterizer",
            scene.models.len(),
            stats.triangles,
            stats.behind_eye,
            self.rasterizer.active_type()
        );
        Ok(stats)
    }

    /// Fills a flat 2D triangle with no depth test and no culling.
    pub fn draw_triangle<B>(
        &self,
        destination: &mut Bitmap<B>,
        region: Option<&Rect>,
        points: [Vec2; 3],
        color: u32,
    ) -> Result<()>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let mut buffer = FrameBuffer::new(destination.view_mut(), None)?.with_region(region)?;
        let triangle = Triangle::new(points.map(|p| Vec3::new(p.x, p.y, 0.0)));
        self.rasterizer.fill_triangle(
            &triangle,
            &mut buffer,
            CullMode::None,
            &FlatShader::new(color),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Projection;

    fn camera() -> Camera {
        Camera::new(
            Vec3::new(0.0, -10.0, 0.0),
            10.0,
            0.1,
            Projection::from_degrees(70.0, 1.0, 0.1, 1000.0),
        )
    }

    #[test]
    fn renders_cube_in_front_of_camera() {
        let mut memory = Memory::new(1 << 16, 1 << 16);
        let mut scene = Scene::new();
        scene.add(Model::cube(&mut memory.permanent).unwrap());

        let mut pixels = vec![0u8; 64 * 64 * 4];
        let mut destination = Bitmap::new(64, 64, 4, pixels.as_mut_slice()).unwrap();

        for rasterizer in [RasterizerType::Scanline, RasterizerType::EdgeFunction] {
            memory.reset_frame();
            let mut renderer = Renderer::new(rasterizer, CullMode::Ccw);
            let stats = renderer
                .render_frame(&mut destination, &camera(), &scene, &mut memory)
                .unwrap();
            assert_eq!(stats.triangles, 12);
            assert_eq!(stats.behind_eye, 0);

            // The cube's -Y face faces the camera and fills the center.
            let center = destination.pixel(32, 32).unwrap();
            assert_ne!(center, colors::BLACK);
            assert_eq!(destination.pixel(0, 0), Some(colors::BLACK));

            let depth = memory.frame.slice(stats.depth).unwrap();
            assert!(depth[32 * 64 + 32] > DepthBuffer::FAR);
            assert_eq!(depth[0], DepthBuffer::FAR);
        }
    }

    #[test]
    fn frame_arena_too_small_is_an_error() {
        let mut memory = Memory::new(1 << 16, 64);
        let scene = Scene::new();
        let mut pixels = vec![0u8; 16 * 16 * 4];
        let mut destination = Bitmap::new(16, 16, 4, pixels.as_mut_slice()).unwrap();

        let result = Renderer::default().render_frame(&mut destination, &camera(), &scene, &mut memory);
        assert!(matches!(result, Err(crate::Error::ArenaExhausted { .. })));
    }

    #[test]
    fn draw_triangle_ignores_winding() {
        let renderer = Renderer::default();
        let mut destination = Bitmap::filled(16, 16, 4);
        let points = [Vec2::new(2.0, 2.0), Vec2::new(2.0, 12.0), Vec2::new(12.0, 2.0)];
        renderer
            .draw_triangle(&mut destination, None, points, colors::RED)
            .unwrap();
        assert_eq!(destination.pixel(4, 4), Some(colors::RED));
        assert_eq!(destination.pixel(14, 14), Some(0));
    }
}
