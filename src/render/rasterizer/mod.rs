//! Triangle rasterization algorithms.
//!
//! Two interchangeable implementations share culling, bounding, the fill
//! rule and the per-pixel depth/shade step, so they cover the same pixels
//! with the same depths and differ only in how they walk the triangle:
//! - [`ScanlineRasterizer`]: Flat-top/flat-bottom triangle decomposition
//! - [`EdgeFunctionRasterizer`]: Bounding box iteration with edge function tests
//!
//! Per triangle the pipeline is Cull, Bound, Scan, Depth test, Shade, Write.
//!
//! # Fill rule
//!
//! Pixel `(x, y)` is sampled at its integer coordinates. A sample exactly on
//! an edge belongs to the triangle only when that edge is a top edge
//! (horizontal, interior below) or a left edge (interior to its right), so
//! triangles sharing an edge never draw a pixel twice.

mod edgefunction;
mod scanline;
mod shader;

pub use edgefunction::EdgeFunctionRasterizer;
pub use scanline::ScanlineRasterizer;
pub use shader::{FlatShader, NormalShader, PixelShader};

use std::str::FromStr;

use super::framebuffer::FrameBuffer;
use crate::geometry::{PixelSpan, Triangle, Winding};

/// Which screen-space winding survives culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    /// Keep both windings.
    #[default]
    None,
    /// Keep clockwise triangles (positive signed area on a y-down screen).
    Cw,
    /// Keep counter-clockwise triangles.
    Ccw,
}

impl CullMode {
    /// Whether a triangle with `winding` is drawn. Degenerate triangles never
    /// are.
    pub fn accepts(self, winding: Winding) -> bool {
        match (self, winding) {
            (_, Winding::Degenerate) => false,
            (CullMode::None, _) => true,
            (CullMode::Cw, Winding::Clockwise) => true,
            (CullMode::Ccw, Winding::CounterClockwise) => true,
            _ => false,
        }
    }
}

/// Trait for triangle rasterization algorithms.
///
/// Implementors define how triangles are walked into a frame buffer.
/// This allows swapping between different rasterization strategies
/// for testing and benchmarking.
pub trait Rasterizer {
    /// Fill a triangle into the frame buffer.
    ///
    /// Triangles rejected by `cull`, degenerate ones and those outside the
    /// buffer's clip box draw nothing.
    ///
    /// # Arguments
    /// * `triangle` - The triangle to rasterize
    /// * `buffer` - The frame buffer to draw into
    /// * `cull` - Windings to keep
    /// * `shader` - Colors each pixel that passes the depth test
    fn fill_triangle<S: PixelShader>(
        &self,
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        cull: CullMode,
        shader: &S,
    );
}

/// Available rasterization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterizerType {
    /// Scanline rasterizer using flat-top/flat-bottom triangle decomposition.
    /// Only visits covered rows and spans.
    #[default]
    Scanline,
    /// Edge function rasterizer that tests each pixel in the bounding box.
    EdgeFunction,
}

impl std::fmt::Display for RasterizerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterizerType::Scanline => write!(f, "Scanline"),
            RasterizerType::EdgeFunction => write!(f, "EdgeFunction"),
        }
    }
}

impl FromStr for RasterizerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scanline" => Ok(RasterizerType::Scanline),
            "edge" | "edgefunction" | "edge_function" => Ok(RasterizerType::EdgeFunction),
            other => Err(format!("unknown rasterizer `{other}`")),
        }
    }
}

/// Holds both rasterizer implementations and forwards to the active one.
#[derive(Debug, Default)]
pub struct RasterizerDispatcher {
    scanline: ScanlineRasterizer,
    edge_function: EdgeFunctionRasterizer,
    active: RasterizerType,
}

impl RasterizerDispatcher {
    pub fn new(rasterizer_type: RasterizerType) -> Self {
        Self {
            scanline: ScanlineRasterizer::new(),
            edge_function: EdgeFunctionRasterizer::new(),
            active: rasterizer_type,
        }
    }

    pub fn set_type(&mut self, rasterizer_type: RasterizerType) {
        self.active = rasterizer_type;
    }

    pub fn active_type(&self) -> RasterizerType {
        self.active
    }
}

impl Rasterizer for RasterizerDispatcher {
    #[inline]
    fn fill_triangle<S: PixelShader>(
        &self,
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        cull: CullMode,
        shader: &S,
    ) {
        match self.active {
            RasterizerType::Scanline => self.scanline.fill_triangle(triangle, buffer, cull, shader),
            RasterizerType::EdgeFunction => {
                self.edge_function
                    .fill_triangle(triangle, buffer, cull, shader)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared steps
// ─────────────────────────────────────────────────────────────────────────────

/// Cull and Bound: the pixels a triangle may cover inside the clip box, or
/// `None` when there is nothing to draw.
#[inline]
pub(crate) fn bound(triangle: &Triangle, buffer: &FrameBuffer, cull: CullMode) -> Option<PixelSpan> {
    if !triangle.signed_area().is_finite() || !cull.accepts(triangle.winding()) {
        return None;
    }

    let tri_box = triangle.aabb();
    let clip = buffer.clip();
    if !tri_box.intersects(&clip) {
        return None;
    }

    let span = tri_box.intersection(&clip).pixel_span();
    (!span.is_empty()).then_some(span)
}

/// True when edge `a -> b` is a top or left edge of a triangle with signed
/// area `area`.
#[inline]
pub(crate) fn is_top_left(a: crate::math::Vec2, b: crate::math::Vec2, area: f32) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dy == 0.0 {
        dx * area > 0.0
    } else {
        -dy * area > 0.0
    }
}

/// Depth test, Shade and Write for one covered pixel.
#[inline]
pub(crate) fn shade_pixel<S: PixelShader>(
    buffer: &mut FrameBuffer,
    triangle: &Triangle,
    x: i32,
    y: i32,
    lambda: [f32; 3],
    shader: &S,
) {
    let depth = triangle.depth_at(lambda);
    if buffer.depth_test(x, y, depth) {
        buffer.set_pixel(x, y, shader.shade(triangle, lambda));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::math::Vec3;

    fn tri(points: [(f32, f32); 3]) -> Triangle<'static> {
        Triangle::new(points.map(|(x, y)| Vec3::new(x, y, 1.0)))
    }

    #[test]
    fn cull_modes_partition_windings() {
        for winding in [Winding::Clockwise, Winding::CounterClockwise] {
            let cw = CullMode::Cw.accepts(winding);
            let ccw = CullMode::Ccw.accepts(winding);
            assert!(cw ^ ccw);
            assert!(CullMode::None.accepts(winding));
        }
        assert!(!CullMode::None.accepts(Winding::Degenerate));
    }

    #[test]
    fn parses_rasterizer_names() {
        assert_eq!(
            "Scanline".parse::<RasterizerType>(),
            Ok(RasterizerType::Scanline)
        );
        assert_eq!(
            "edge".parse::<RasterizerType>(),
            Ok(RasterizerType::EdgeFunction)
        );
        assert!("wireframe".parse::<RasterizerType>().is_err());
    }

    #[test]
    fn bound_rejects_outside_and_culled() {
        let mut color = Bitmap::filled(16, 16, 4);
        let fb = FrameBuffer::new(color.view_mut(), None).unwrap();

        let outside = tri([(20.0, 20.0), (30.0, 20.0), (25.0, 30.0)]);
        assert_eq!(bound(&outside, &fb, CullMode::None), None);

        let cw = tri([(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
        assert!(bound(&cw, &fb, CullMode::Cw).is_some());
        assert_eq!(bound(&cw, &fb, CullMode::Ccw), None);
    }

    #[test]
    fn top_left_classification() {
        use crate::math::Vec2;
        // Clockwise (positive area) triangle (0,0) (10,0) (5,10).
        let area = 100.0;
        let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(5.0, 10.0));
        assert!(is_top_left(a, b, area), "horizontal edge with interior below");
        assert!(!is_top_left(b, c, area), "right edge");
        assert!(is_top_left(c, a, area), "left edge");
    }
}
