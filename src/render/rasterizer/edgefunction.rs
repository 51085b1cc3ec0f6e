//! Edge function-based triangle rasterization.
//!
//! Every pixel in the triangle's clipped bounding box is tested against the
//! three edge equations; this is the formulation GPUs build on.
//!
//! # Edge Function
//!
//! For an edge from point A to point B, the edge function at point P is the
//! 2D cross product
//!
//! ```text
//! E(P) = (B - A) × (P - A) = (B.x - A.x) * (P.y - A.y) - (B.y - A.y) * (P.x - A.x)
//! ```
//!
//! which is zero on the line through A and B and changes sign across it. For
//! a point inside the triangle all three values share the sign of the
//! triangle's signed area.
//!
//! # Barycentric Coordinates
//!
//! ```text
//! lambda_i = E_i(P) / area
//! ```
//!
//! where E_i is the edge function of the edge opposite vertex i.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::{bound, is_top_left, shade_pixel, CullMode, PixelShader, Rasterizer};
use crate::geometry::{edge, Triangle};
use crate::math::Vec2;
use crate::render::framebuffer::FrameBuffer;

/// Triangle rasterizer using the edge function algorithm.
///
/// # Characteristics
///
/// - **Simplicity**: One uniform inside test, no special cases per shape
/// - **Parallelizable**: Each pixel can be evaluated independently
///
/// The bounding box approach tests many pixels outside thin or elongated
/// triangles.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Inside test for one edge value, already multiplied by the sign of the
    /// triangle's area so the interior is positive.
    #[inline]
    fn covers(w: f32, top_left: bool) -> bool {
        w > 0.0 || (w == 0.0 && top_left)
    }
}

impl Rasterizer for EdgeFunctionRasterizer {
    fn fill_triangle<S: PixelShader>(
        &self,
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        cull: CullMode,
        shader: &S,
    ) {
        // ─────────────────────────────────────────────────────────────────────
        // Step 1: Cull and clip the bounding box
        // ─────────────────────────────────────────────────────────────────────
        let Some(span) = bound(triangle, buffer, cull) else {
            return;
        };

        // ─────────────────────────────────────────────────────────────────────
        // Step 2: Signed area and per-edge fill rule
        // ─────────────────────────────────────────────────────────────────────
        let [v0, v1, v2] = triangle.points.map(|p| p.xy());
        let area = triangle.signed_area();
        let inv_area = 1.0 / area;
        let sign = area.signum();

        let top_left = [
            is_top_left(v1, v2, area),
            is_top_left(v2, v0, area),
            is_top_left(v0, v1, area),
        ];

        // ─────────────────────────────────────────────────────────────────────
        // Step 3: Test every pixel of the box
        // ─────────────────────────────────────────────────────────────────────
        for y in span.y0..span.y1 {
            for x in span.x0..span.x1 {
                let p = Vec2::new(x as f32, y as f32);

                let w0 = edge(v1, v2, p);
                let w1 = edge(v2, v0, p);
                let w2 = edge(v0, v1, p);

                if Self::covers(w0 * sign, top_left[0])
                    && Self::covers(w1 * sign, top_left[1])
                    && Self::covers(w2 * sign, top_left[2])
                {
                    let l0 = w0 * inv_area;
                    let l1 = w1 * inv_area;
                    shade_pixel(buffer, triangle, x, y, [l0, l1, 1.0 - l0 - l1], shader);
                }
            }
        }
    }
}
