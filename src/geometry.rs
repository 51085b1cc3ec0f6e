//! Screen-space geometry: bounding boxes, rectangles, vertices and projected
//! triangles.
//!
//! # Pixel coverage
//!
//! Pixels are sampled at integer coordinates. A pixel `p` belongs to a box
//! when `min <= p < max` on both axes, which is the same half-open rule the
//! rasterizers use for triangle edges. Boxes with integer corners therefore
//! cover exactly `width * height` pixels.

use bytemuck::{Pod, Zeroable};

use crate::math::{Mat4, Vec2, Vec3, Vec4};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

/// Integer pixel range `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSpan {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelSpan {
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }
}

impl Aabb {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self::new(center - half, center + half)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// True unless the boxes are disjoint on some axis. Touching edges count
    /// as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y)
    }

    /// Overlap of two boxes.
    ///
    /// Only meaningful after [`Aabb::intersects`] returned true; disjoint
    /// boxes produce an inverted box.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Pixels sampled inside this box.
    pub fn pixel_span(&self) -> PixelSpan {
        PixelSpan {
            x0: self.min.x.ceil() as i32,
            y0: self.min.y.ceil() as i32,
            x1: self.max.x.ceil() as i32,
            y1: self.max.y.ceil() as i32,
        }
    }
}

/// Rectangle described by its center and extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Rectangle whose top-left corner is at `(x, y)`.
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vec2::new(x + width / 2.0, y + height / 2.0), width, height)
    }

    /// Rectangle covering a whole `width x height` surface.
    pub fn covering(width: u32, height: u32) -> Self {
        Self::from_top_left(0.0, 0.0, width as f32, height as f32)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.center, Vec2::new(self.width, self.height))
    }
}

/// A mesh vertex. Immutable once the model is loaded.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub const fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Screen-space winding of a triangle on a y-down surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    Degenerate,
}

/// A triangle ready for rasterization in screen space.
///
/// `points` hold pixel x/y and the post-divide depth. `inv_w` holds the
/// reciprocal clip-space w of each corner, used to keep attribute
/// interpolation perspective correct; it is 1.0 for plain 2D triangles.
/// `source` borrows the model vertices the corners came from and lives only
/// as long as that borrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle<'a> {
    pub points: [Vec3; 3],
    pub inv_w: [f32; 3],
    pub source: Option<[&'a Vertex; 3]>,
}

impl<'a> Triangle<'a> {
    /// A 2D triangle without source vertices.
    pub fn new(points: [Vec3; 3]) -> Self {
        Self {
            points,
            inv_w: [1.0; 3],
            source: None,
        }
    }

    pub fn aabb(&self) -> Aabb {
        let [a, b, c] = self.points.map(|p| p.xy());
        Aabb::new(a.min(b).min(c), a.max(b).max(c))
    }

    /// Twice the signed area, `(v1 - v0) x (v2 - v0)`.
    ///
    /// Positive for clockwise triangles on a y-down screen.
    pub fn signed_area(&self) -> f32 {
        let [v0, v1, v2] = self.points.map(|p| p.xy());
        (v1 - v0).perp_dot(v2 - v0)
    }

    pub fn winding(&self) -> Winding {
        let area = self.signed_area();
        if area > 0.0 {
            Winding::Clockwise
        } else if area < 0.0 {
            Winding::CounterClockwise
        } else {
            Winding::Degenerate
        }
    }

    /// Barycentric weights of `p`, always relative to this triangle's own
    /// corners. Callers must reject zero-area triangles first.
    #[inline]
    pub fn barycentric(&self, p: Vec2) -> [f32; 3] {
        let [v0, v1, v2] = self.points.map(|p| p.xy());
        let inv_area = 1.0 / (v1 - v0).perp_dot(v2 - v0);
        let w0 = edge(v1, v2, p) * inv_area;
        let w1 = edge(v2, v0, p) * inv_area;
        [w0, w1, 1.0 - w0 - w1]
    }

    /// Interpolated depth for barycentric weights.
    #[inline]
    pub fn depth_at(&self, lambda: [f32; 3]) -> f32 {
        lambda[0] * self.points[0].z + lambda[1] * self.points[1].z + lambda[2] * self.points[2].z
    }

    /// Reweights screen-space barycentrics so attributes interpolate
    /// linearly in view space.
    #[inline]
    pub fn perspective_weights(&self, lambda: [f32; 3]) -> [f32; 3] {
        let weighted = [
            lambda[0] * self.inv_w[0],
            lambda[1] * self.inv_w[1],
            lambda[2] * self.inv_w[2],
        ];
        let sum = weighted[0] + weighted[1] + weighted[2];
        if sum == 0.0 {
            return lambda;
        }
        weighted.map(|w| w / sum)
    }
}

/// Edge function `(b - a) x (p - a)`: zero on the line through `a` and `b`,
/// its sign tells the side `p` lies on.
#[inline]
pub fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Projects three model vertices to screen space.
///
/// Each position goes through `mvp`, is divided by w and mapped from
/// [-1, 1] NDC to `[0, screen]` pixels. No clipping happens against
/// `w <= 0`; vertices behind the camera produce meaningless coordinates.
pub fn project_triangle<'a>(
    v0: &'a Vertex,
    v1: &'a Vertex,
    v2: &'a Vertex,
    mvp: &Mat4,
    screen_width: f32,
    screen_height: f32,
) -> Triangle<'a> {
    let project = |v: &Vertex| -> (Vec3, f32) {
        let clip = *mvp * Vec4::from_vec3(v.position, 1.0);
        let ndc = clip.perspective_divide();
        let screen = Vec3::new(
            (ndc.x + 1.0) / 2.0 * screen_width,
            (ndc.y + 1.0) / 2.0 * screen_height,
            ndc.z,
        );
        (screen, 1.0 / clip.w)
    };

    let (p0, w0) = project(v0);
    let (p1, w1) = project(v1);
    let (p2, w2) = project(v2);

    Triangle {
        points: [p0, p1, p2],
        inv_w: [w0, w1, w2],
        source: Some([v0, v1, v2]),
    }
}

/// Inverse of the screen mapping used by [`project_triangle`].
///
/// `screen` is a projected point (pixel x/y, depth), `inv_w` its reciprocal
/// clip w and `inv_mvp` the inverse of the projecting matrix.
pub fn unproject(
    screen: Vec3,
    inv_w: f32,
    inv_mvp: &Mat4,
    screen_width: f32,
    screen_height: f32,
) -> Vec3 {
    let w = 1.0 / inv_w;
    let ndc = Vec3::new(
        screen.x / screen_width * 2.0 - 1.0,
        screen.y / screen_height * 2.0 - 1.0,
        screen.z,
    );
    let clip = Vec4::from_vec3(ndc * w, w);
    (*inv_mvp * clip).perspective_divide()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn aabb(x0: f32, y0: f32, x1: f32, y1: f32) -> Aabb {
        Aabb::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = aabb(0.0, 0.0, 10.0, 10.0);
        let b = aabb(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = aabb(0.0, 0.0, 10.0, 10.0);
        let b = aabb(0.0, 10.5, 10.0, 20.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn intersects_is_symmetric_over_a_grid() {
        let boxes: Vec<Aabb> = (0..6)
            .flat_map(|i| {
                (0..6).map(move |j| {
                    let x = i as f32 * 3.0 - 5.0;
                    let y = j as f32 * 2.5 - 4.0;
                    aabb(x, y, x + 4.0 + i as f32, y + 1.5 * j as f32)
                })
            })
            .collect();
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersects(b), b.intersects(a));
            }
        }
    }

    #[test]
    fn intersection_and_union() {
        let a = aabb(0.0, 0.0, 10.0, 10.0);
        let b = aabb(5.0, -5.0, 15.0, 5.0);
        assert_eq!(a.intersection(&b), aabb(5.0, 0.0, 10.0, 5.0));
        assert_eq!(a.union(&b), aabb(0.0, -5.0, 15.0, 10.0));
    }

    #[test]
    fn pixel_span_is_half_open() {
        let span = aabb(0.0, 0.0, 4.0, 3.0).pixel_span();
        assert_eq!(span.width(), 4);
        assert_eq!(span.height(), 3);

        let frac = aabb(0.5, 0.25, 3.5, 2.0).pixel_span();
        assert_eq!((frac.x0, frac.x1, frac.y0, frac.y1), (1, 4, 1, 2));
    }

    #[test]
    fn rect_from_center() {
        let r = Rect::new(Vec2::new(10.0, 20.0), 4.0, 6.0);
        assert_eq!(r.aabb(), aabb(8.0, 17.0, 12.0, 23.0));
        assert_eq!(Rect::covering(8, 4).aabb(), aabb(0.0, 0.0, 8.0, 4.0));
    }

    #[test]
    fn winding_classification() {
        let cw = Triangle::new([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        ]);
        assert_eq!(cw.winding(), Winding::Clockwise);

        let ccw = Triangle::new([cw.points[0], cw.points[2], cw.points[1]]);
        assert_eq!(ccw.winding(), Winding::CounterClockwise);

        let flat = Triangle::new([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 5.0, 0.0),
            Vec3::new(10.0, 10.0, 0.0),
        ]);
        assert_eq!(flat.winding(), Winding::Degenerate);
    }

    #[test]
    fn barycentric_weights_hit_corners_and_sum_to_one() {
        let tri = Triangle::new([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(8.0, 0.0, 0.0),
            Vec3::new(0.0, 8.0, 0.0),
        ]);
        assert_eq!(tri.barycentric(Vec2::new(0.0, 0.0)), [1.0, 0.0, 0.0]);
        let l = tri.barycentric(Vec2::new(8.0, 0.0));
        assert_relative_eq!(l[1], 1.0);
        let m = tri.barycentric(Vec2::new(2.0, 3.0));
        assert_relative_eq!(m[0] + m[1] + m[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn identity_projection_maps_ndc_to_pixels() {
        let v = [
            Vertex::new(Vec3::new(-1.0, -1.0, 0.5), Vec3::Z, Vec2::ZERO),
            Vertex::new(Vec3::new(1.0, -1.0, 0.5), Vec3::Z, Vec2::ZERO),
            Vertex::new(Vec3::new(0.0, 1.0, 0.5), Vec3::Z, Vec2::ZERO),
        ];
        let tri = project_triangle(&v[0], &v[1], &v[2], &Mat4::IDENTITY, 200.0, 100.0);
        assert_eq!(tri.points[0], Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(tri.points[1], Vec3::new(200.0, 0.0, 0.5));
        assert_eq!(tri.points[2], Vec3::new(100.0, 100.0, 0.5));
        assert_eq!(tri.inv_w, [1.0; 3]);
        assert!(tri.source.is_some());
    }

    #[test]
    fn perspective_weights_favor_nearer_corners() {
        let mut tri = Triangle::new([Vec3::ZERO, Vec3::X, Vec3::Y]);
        tri.inv_w = [1.0, 0.25, 0.25];

        let w = tri.perspective_weights([1.0 / 3.0; 3]);
        assert_relative_eq!(w[0], 2.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(w[1], 1.0 / 6.0, epsilon = 1e-6);
        assert_relative_eq!(w[2], 1.0 / 6.0, epsilon = 1e-6);

        let w = tri.perspective_weights([0.5, 0.5, 0.0]);
        assert_relative_eq!(w[0], 0.8, epsilon = 1e-6);
        assert_relative_eq!(w[1], 0.2, epsilon = 1e-6);
        assert_eq!(w[2], 0.0);

        assert_eq!(tri.perspective_weights([0.0, 1.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn perspective_weights_recover_the_projected_point() {
        let proj = Mat4::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0);
        let v = [
            Vertex::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::Z, Vec2::ZERO),
            Vertex::new(Vec3::new(4.0, 1.0, 8.0), Vec3::Z, Vec2::ZERO),
            Vertex::new(Vec3::new(-2.0, 3.0, 5.0), Vec3::Z, Vec2::ZERO),
        ];
        let tri = project_triangle(&v[0], &v[1], &v[2], &proj, 100.0, 100.0);
        assert_relative_eq!(tri.inv_w[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(tri.inv_w[1], 0.125, epsilon = 1e-6);

        let [a, b, c] = tri.points.map(|p| p.xy());
        let p = a * 0.3 + b * 0.5 + c * 0.2;
        let lambda = tri.barycentric(p);
        let w = tri.perspective_weights(lambda);
        assert!(w[0] > lambda[0] + 0.1);

        // The reweighted view-space point lands back on the sampled pixel.
        let view = v[0].position * w[0] + v[1].position * w[1] + v[2].position * w[2];
        let ndc = (proj * Vec4::from_vec3(view, 1.0)).perspective_divide();
        assert_relative_eq!((ndc.x + 1.0) * 50.0, p.x, epsilon = 1e-3);
        assert_relative_eq!((ndc.y + 1.0) * 50.0, p.y, epsilon = 1e-3);
    }
}
