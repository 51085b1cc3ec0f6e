//! Scanline-based triangle rasterization.
//!
//! Classic flat-top/flat-bottom decomposition: the triangle is walked one
//! horizontal row at a time between its left and right edges.
//!
//! # Triangle Decomposition
//!
//! Any triangle can be decomposed into at most two simpler triangles:
//!
//! ```text
//!        v0                   v0
//!        /\                   /\
//!       /  \                 /  \
//!      /    \       =>      /----\<- split at v1.y
//!     /      \             v1   split
//!    /________\             \    /
//!   v1        v2             \  /
//!                             \/
//!                             v2
//!
//!   General triangle      Flat-bottom (top) + Flat-top (bottom)
//! ```
//!
//! The split vertex lies on the long edge v0 -> v2 at the height of v1. Both
//! halves evaluate that long edge directly, so the seam between them is
//! exact.
//!
//! # Coverage
//!
//! Rows run from `ceil(y_top)` up to but excluding `ceil(y_bottom)`, columns
//! from `ceil(x_left)` up to but excluding `ceil(x_right)`. This is the same
//! top-left rule the edge function rasterizer applies, so both produce the
//! same pixels. Depth and shading use barycentric weights of the original
//! triangle, never of the halves.
//!
//! Edge x-intercepts are evaluated directly per row instead of being stepped
//! by the inverse slope. Accumulated steps drift, and the drift would move
//! pixels on the seam shared with a neighbouring triangle.
//!
//! # References
//!
//! - Foley, van Dam et al., "Computer Graphics: Principles and Practice"
//! - Abrash, Michael, "Graphics Programming Black Book"

use super::{bound, shade_pixel, CullMode, PixelShader, Rasterizer};
use crate::geometry::{PixelSpan, Triangle};
use crate::math::Vec2;
use crate::render::framebuffer::FrameBuffer;

/// A non-horizontal edge, `top.y < bottom.y`.
#[derive(Debug, Clone, Copy)]
struct Edge {
    top: Vec2,
    bottom: Vec2,
}

impl Edge {
    fn new(top: Vec2, bottom: Vec2) -> Self {
        Self { top, bottom }
    }

    /// X of the edge at height `y`.
    ///
    /// Multiplies before dividing so edges between integer points land
    /// exactly on integer columns.
    #[inline]
    fn x_at(&self, y: f32) -> f32 {
        self.top.x + (self.bottom.x - self.top.x) * (y - self.top.y) / (self.bottom.y - self.top.y)
    }
}

/// Scanline-based triangle rasterizer.
///
/// # Characteristics
///
/// - **Cache-friendly**: Processes pixels in row order
/// - **Efficient for thin triangles**: Only visits pixels actually covered
///
/// Vertices are sorted internally, so input triangles can have any order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanlineRasterizer;

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Sorts three vertices by Y coordinate (ascending: top to bottom in screen space).
    ///
    /// Three compare-and-swaps suffice for three elements.
    /// After sorting: `v0.y <= v1.y <= v2.y`
    fn sort_vertices(v0: &mut Vec2, v1: &mut Vec2, v2: &mut Vec2) {
        if v1.y < v0.y {
            std::mem::swap(v0, v1);
        }
        if v2.y < v1.y {
            std::mem::swap(v1, v2);
        }
        if v1.y < v0.y {
            std::mem::swap(v0, v1);
        }
    }

    /// Fills a flat-bottom triangle.
    ///
    /// ```text
    ///        v0 (top)
    ///        /\
    ///       /  \
    ///      /____\
    ///    e1      e2  (same Y)
    /// ```
    ///
    /// Rows span `e1`; `e2` may extend further down when this is the upper
    /// half of a split triangle.
    fn fill_flat_bottom<S: PixelShader>(
        e1: Edge,
        e2: Edge,
        ctx: &mut ScanContext<'_, '_, '_, S>,
    ) {
        ctx.fill_rows(e1.top.y, e1.bottom.y, e1, e2);
    }

    /// Fills a flat-top triangle.
    ///
    /// ```text
    ///   e1________e2  (same Y)
    ///     \      /
    ///      \    /
    ///       \  /
    ///        \/
    ///        v2 (bottom)
    /// ```
    ///
    /// Rows span `e1`; `e2` may start higher up when this is the lower half
    /// of a split triangle.
    fn fill_flat_top<S: PixelShader>(e1: Edge, e2: Edge, ctx: &mut ScanContext<'_, '_, '_, S>) {
        ctx.fill_rows(e1.top.y, e1.bottom.y, e1, e2);
    }
}

/// Everything the row walker needs besides the edges.
struct ScanContext<'t, 'b, 'f, S> {
    triangle: &'t Triangle<'t>,
    buffer: &'b mut FrameBuffer<'f>,
    span: PixelSpan,
    shader: &'t S,
}

impl<S: PixelShader> ScanContext<'_, '_, '_, S> {
    /// Fills rows `ceil(y_top) .. ceil(y_bottom)` between two edges, clamped
    /// to the clip span.
    fn fill_rows(&mut self, y_top: f32, y_bottom: f32, a: Edge, b: Edge) {
        let row_start = (y_top.ceil() as i32).max(self.span.y0);
        let row_end = (y_bottom.ceil() as i32).min(self.span.y1);

        for y in row_start..row_end {
            let yf = y as f32;
            let xa = a.x_at(yf);
            let xb = b.x_at(yf);
            let (x_left, x_right) = if xa < xb { (xa, xb) } else { (xb, xa) };
            self.fill_span(y, x_left, x_right);
        }
    }

    #[inline]
    fn fill_span(&mut self, y: i32, x_left: f32, x_right: f32) {
        let col_start = (x_left.ceil() as i32).max(self.span.x0);
        let col_end = (x_right.ceil() as i32).min(self.span.x1);

        for x in col_start..col_end {
            let lambda = self.triangle.barycentric(Vec2::new(x as f32, y as f32));
            shade_pixel(self.buffer, self.triangle, x, y, lambda, self.shader);
        }
    }
}

impl Rasterizer for ScanlineRasterizer {
    /// Fills a triangle using the scanline algorithm.
    ///
    /// # Algorithm Steps
    ///
    /// 1. **Cull and bound** against the frame buffer's clip box
    /// 2. **Sort vertices** by Y coordinate (top to bottom)
    /// 3. **Classify triangle shape**:
    ///    - If `v1.y == v2.y`: Already flat-bottom, no split needed
    ///    - If `v0.y == v1.y`: Already flat-top, no split needed
    ///    - Otherwise: split at the middle vertex's Y level
    /// 4. **Rasterize** the halves row by row
    ///
    /// Flatness is checked before any inverse slope is formed, so no edge is
    /// ever divided by a zero height.
    fn fill_triangle<S: PixelShader>(
        &self,
        triangle: &Triangle,
        buffer: &mut FrameBuffer,
        cull: CullMode,
        shader: &S,
    ) {
        let Some(span) = bound(triangle, buffer, cull) else {
            return;
        };

        let [mut v0, mut v1, mut v2] = triangle.points.map(|p| p.xy());
        Self::sort_vertices(&mut v0, &mut v1, &mut v2);

        let mut ctx = ScanContext {
            triangle,
            buffer,
            span,
            shader,
        };

        if v1.y == v2.y {
            // Case 1: Already flat-bottom
            Self::fill_flat_bottom(Edge::new(v0, v1), Edge::new(v0, v2), &mut ctx);
        } else if v0.y == v1.y {
            // Case 2: Already flat-top
            Self::fill_flat_top(Edge::new(v0, v2), Edge::new(v1, v2), &mut ctx);
        } else {
            // Case 3: General triangle, split at v1's Y level. The split
            // vertex is `long.x_at(v1.y)`; each half reads it off the long
            // edge row by row.
            let long = Edge::new(v0, v2);
            Self::fill_flat_bottom(Edge::new(v0, v1), long, &mut ctx);
            Self::fill_flat_top(Edge::new(v1, v2), long, &mut ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EdgeFunctionRasterizer, FlatShader};
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn edge_hits_integer_columns_exactly() {
        let e = Edge::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 30.0));
        assert_eq!(e.x_at(3.0), 1.0);
        assert_eq!(e.x_at(21.0), 7.0);
    }

    #[test]
    fn flat_top_and_flat_bottom_match_edge_function() {
        let shapes = [
            // flat bottom
            [(5.0, 1.0), (1.0, 9.0), (11.0, 9.0)],
            // flat top
            [(1.0, 2.0), (12.0, 2.0), (6.0, 11.0)],
            // general, middle vertex on the left
            [(6.0, 0.0), (0.0, 5.0), (9.0, 13.0)],
            // general, middle vertex on the right
            [(3.0, 1.0), (13.0, 7.0), (1.0, 12.0)],
        ];

        for shape in shapes {
            let tri = Triangle::new(shape.map(|(x, y)| Vec3::new(x, y, 0.25 + x / 64.0)));

            let mut a = Bitmap::filled(16, 16, 4);
            let mut depth_a = vec![0.0; 256];
            let mut fb = FrameBuffer::new(
                a.view_mut(),
                Some(crate::render::DepthBuffer::new(&mut depth_a, 16, 16).unwrap()),
            )
            .unwrap();
            ScanlineRasterizer::new().fill_triangle(
                &tri,
                &mut fb,
                CullMode::None,
                &FlatShader::new(0xFFFF_FFFF),
            );
            drop(fb);

            let mut b = Bitmap::filled(16, 16, 4);
            let mut depth_b = vec![0.0; 256];
            let mut fb = FrameBuffer::new(
                b.view_mut(),
                Some(crate::render::DepthBuffer::new(&mut depth_b, 16, 16).unwrap()),
            )
            .unwrap();
            EdgeFunctionRasterizer::new().fill_triangle(
                &tri,
                &mut fb,
                CullMode::None,
                &FlatShader::new(0xFFFF_FFFF),
            );
            drop(fb);

            assert_eq!(a.data(), b.data(), "coverage differs for {shape:?}");
            for (da, db) in depth_a.iter().zip(&depth_b) {
                assert_relative_eq!(*da, *db, epsilon = 1e-4);
            }
        }
    }
}
