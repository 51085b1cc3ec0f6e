//! Pixel shaders for triangle rasterization.
//!
//! The rasterizer decides which pixels a triangle covers and whether they
//! pass the depth test; a [`PixelShader`] then turns the pixel's barycentric
//! weights into a color.
//!
//! # Barycentric Coordinates
//!
//! `lambda` holds three weights [λ₀, λ₁, λ₂] relative to the triangle's own
//! corners. They sum to 1.0 and interpolate any per-vertex attribute as
//! `λ₀*attr₀ + λ₁*attr₁ + λ₂*attr₂`. The weights are linear in screen space;
//! attributes of projected triangles go through
//! [`Triangle::perspective_weights`] first.

use crate::colors::pack_color;
use crate::geometry::Triangle;
use crate::math::Vec3;

/// Trait for per-pixel shading computations.
pub trait PixelShader {
    /// Compute the color for a covered pixel.
    ///
    /// # Arguments
    /// * `triangle` - The triangle being rasterized
    /// * `lambda` - Barycentric coordinates [λ₀, λ₁, λ₂] that sum to 1.0
    fn shade(&self, triangle: &Triangle, lambda: [f32; 3]) -> u32;
}

/// Flat shader: the same color for every pixel.
#[derive(Debug, Clone, Copy)]
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _triangle: &Triangle, _lambda: [f32; 3]) -> u32 {
        self.color
    }
}

/// Colors pixels by the interpolated vertex normal.
///
/// The three source normals are blended with perspective-correct weights and
/// each axis magnitude becomes one 8-bit channel (x red, y green, z blue).
/// Triangles without source vertices get `fallback`.
#[derive(Debug, Clone, Copy)]
pub struct NormalShader {
    fallback: u32,
}

impl NormalShader {
    pub fn new(fallback: u32) -> Self {
        Self { fallback }
    }

    #[inline]
    fn interpolate(triangle: &Triangle, lambda: [f32; 3]) -> Option<Vec3> {
        let [v0, v1, v2] = triangle.source?;
        let w = triangle.perspective_weights(lambda);
        Some(v0.normal * w[0] + v1.normal * w[1] + v2.normal * w[2])
    }
}

impl Default for NormalShader {
    fn default() -> Self {
        Self::new(crate::colors::WHITE)
    }
}

impl PixelShader for NormalShader {
    #[inline]
    fn shade(&self, triangle: &Triangle, lambda: [f32; 3]) -> u32 {
        let Some(n) = Self::interpolate(triangle, lambda) else {
            return self.fallback;
        };
        let n = n.abs();
        pack_color(1.0, n.x, n.y, n.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::argb;
    use crate::geometry::{project_triangle, Vertex};
    use crate::math::{Mat4, Vec2};

    fn flat_triangle() -> Triangle<'static> {
        Triangle::new([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        ])
    }

    #[test]
    fn normal_shader_maps_axes_to_channels() {
        let verts = [
            Vertex::new(Vec3::ZERO, Vec3::X, Vec2::ZERO),
            Vertex::new(Vec3::ZERO, -Vec3::Y, Vec2::ZERO),
            Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::ZERO),
        ];
        let mut tri = flat_triangle();
        tri.source = Some([&verts[0], &verts[1], &verts[2]]);

        let shader = NormalShader::default();
        assert_eq!(shader.shade(&tri, [1.0, 0.0, 0.0]), 0xFFFF_0000);
        assert_eq!(shader.shade(&tri, [0.0, 1.0, 0.0]), 0xFF00_FF00);
        assert_eq!(shader.shade(&tri, [0.0, 0.0, 1.0]), 0xFF00_00FF);
    }

    #[test]
    fn normal_shader_falls_back_without_source() {
        let shader = NormalShader::new(0xFF12_3456);
        assert_eq!(shader.shade(&flat_triangle(), [0.3, 0.3, 0.4]), 0xFF12_3456);
    }

    #[test]
    fn normal_shader_blends_perspective_correctly() {
        let proj = Mat4::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0);
        let verts = [
            Vertex::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::X, Vec2::ZERO),
            Vertex::new(Vec3::new(4.0, 1.0, 8.0), Vec3::Y, Vec2::ZERO),
            Vertex::new(Vec3::new(-2.0, 3.0, 5.0), -Vec3::Z, Vec2::ZERO),
        ];
        let tri = project_triangle(&verts[0], &verts[1], &verts[2], &proj, 100.0, 100.0);

        // 1/w = [1/2, 1/8, 1/5] turns the screen centroid into [20, 5, 8] / 33.
        let color = NormalShader::default().shade(&tri, [1.0 / 3.0; 3]);
        assert_eq!(color, argb(0xFF, 154, 38, 61));
        assert_ne!(color, argb(0xFF, 85, 85, 85));
    }
}
