//! 4x4 transformation matrix using column-major convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - The matrix is stored as four column vectors; translation is the last one
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//!
//! # Example
//! ```ignore
//! let transform = rotation * scale;  // scale applied first, then rotation
//! let result = transform * vertex;   // transform the vertex
//! ```

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// Squared-norm tolerance under which a rotation axis counts as unit length.
const UNIT_AXIS_TOLERANCE: f32 = 1e-4;

/// 4x4 matrix stored as four columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4::from_cols([
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ]);

    pub const fn from_cols(cols: [Vec4; 4]) -> Self {
        Mat4 { cols }
    }

    /// Builds a matrix from rows as written on paper.
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let col = |c: usize| Vec4::new(rows[0][c], rows[1][c], rows[2][c], rows[3][c]);
        Mat4::from_cols([col(0), col(1), col(2), col(3)])
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Creates a translation matrix.
    pub fn translation(offset: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = Vec4::from_vec3(offset, 1.0);
        m
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat4::from_cols([
            Vec4::new(x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, z, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ])
    }

    /// Rotation of `angle` radians around `axis`, counter-clockwise when the
    /// axis points at the viewer.
    ///
    /// A zero axis yields the identity. An axis that is not unit length is
    /// normalized first.
    pub fn rotation(axis: Vec3, angle: f32) -> Self {
        let sqr_norm = axis.length_squared();
        if sqr_norm == 0.0 {
            return Self::IDENTITY;
        }
        if (sqr_norm - 1.0).abs() > UNIT_AXIS_TOLERANCE {
            return Self::rotation(axis / sqr_norm.sqrt(), angle);
        }

        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = axis;

        Mat4::from_cols([
            Vec4::new(x * x * t + c, y * x * t + z * s, z * x * t - y * s, 0.0),
            Vec4::new(x * y * t - z * s, y * y * t + c, z * y * t + x * s, 0.0),
            Vec4::new(x * z * t + y * s, y * z * t - x * s, z * z * t + c, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ])
    }

    /// Creates a rotation matrix around the X axis.
    pub fn rotation_x(angle: f32) -> Self {
        Self::rotation(Vec3::X, angle)
    }

    /// Creates a rotation matrix around the Y axis.
    pub fn rotation_y(angle: f32) -> Self {
        Self::rotation(Vec3::Y, angle)
    }

    /// Creates a rotation matrix around the Z axis.
    pub fn rotation_z(angle: f32) -> Self {
        Self::rotation(Vec3::Z, angle)
    }

    /// Reverse-Z perspective projection.
    ///
    /// View space is X right, Y down, Z forward. After the perspective divide
    /// depth is 1.0 on the near plane and 0.0 on the far plane, so nearer
    /// surfaces always carry the larger depth value.
    ///
    /// `near == far` is not rejected; it produces a non-finite depth row.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let g = 1.0 / (fov_y / 2.0).tan();
        let k = near / (near - far);
        Mat4::from_rows([
            [g / aspect, 0.0, 0.0, 0.0],
            [0.0, g, 0.0, 0.0],
            [0.0, 0.0, k, -far * k],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Reverse-Z perspective with the far plane at infinity: depth = near / z.
    pub fn perspective_infinite(fov_y: f32, aspect: f32, near: f32) -> Self {
        let g = 1.0 / (fov_y / 2.0).tan();
        Mat4::from_rows([
            [g / aspect, 0.0, 0.0, 0.0],
            [0.0, g, 0.0, 0.0],
            [0.0, 0.0, 0.0, near],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cols[col].get(row)
    }

    #[inline]
    pub fn col(&self, index: usize) -> Vec4 {
        self.cols[index]
    }

    pub fn transpose(&self) -> Self {
        let c = &self.cols;
        Mat4::from_cols([
            Vec4::new(c[0].x, c[1].x, c[2].x, c[3].x),
            Vec4::new(c[0].y, c[1].y, c[2].y, c[3].y),
            Vec4::new(c[0].z, c[1].z, c[2].z, c[3].z),
            Vec4::new(c[0].w, c[1].w, c[2].w, c[3].w),
        ])
    }

    /// Inverse of a rotation followed by a translation.
    ///
    /// Only valid when the upper 3x3 block is orthonormal: the rotation is
    /// transposed and the translation rotated back, `R^T * T(-t)`.
    pub fn inverse_rigid(&self) -> Self {
        let mut rotation_t = Mat4::from_cols([
            Vec4::direction(self.cols[0].x, self.cols[1].x, self.cols[2].x),
            Vec4::direction(self.cols[0].y, self.cols[1].y, self.cols[2].y),
            Vec4::direction(self.cols[0].z, self.cols[1].z, self.cols[2].z),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ]);
        let t = self.cols[3].to_vec3();
        rotation_t.cols[3] = Vec4::from_vec3(-rotation_t.transform_vector(t), 1.0);
        rotation_t
    }

    /// General inverse, `None` when the matrix is singular.
    ///
    /// Uses the 2x2 sub-determinant expansion over the top and bottom row
    /// pairs.
    pub fn inverse(&self) -> Option<Mat4> {
        let m = |r: usize, c: usize| self.get(r, c);

        let s0 = m(0, 0) * m(1, 1) - m(1, 0) * m(0, 1);
        let s1 = m(0, 0) * m(1, 2) - m(1, 0) * m(0, 2);
        let s2 = m(0, 0) * m(1, 3) - m(1, 0) * m(0, 3);
        let s3 = m(0, 1) * m(1, 2) - m(1, 1) * m(0, 2);
        let s4 = m(0, 1) * m(1, 3) - m(1, 1) * m(0, 3);
        let s5 = m(0, 2) * m(1, 3) - m(1, 2) * m(0, 3);

        let c5 = m(2, 2) * m(3, 3) - m(3, 2) * m(2, 3);
        let c4 = m(2, 1) * m(3, 3) - m(3, 1) * m(2, 3);
        let c3 = m(2, 1) * m(3, 2) - m(3, 1) * m(2, 2);
        let c2 = m(2, 0) * m(3, 3) - m(3, 0) * m(2, 3);
        let c1 = m(2, 0) * m(3, 2) - m(3, 0) * m(2, 2);
        let c0 = m(2, 0) * m(3, 1) - m(3, 0) * m(2, 1);

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;

        Some(Mat4::from_rows([
            [
                (m(1, 1) * c5 - m(1, 2) * c4 + m(1, 3) * c3) * inv,
                (-m(0, 1) * c5 + m(0, 2) * c4 - m(0, 3) * c3) * inv,
                (m(3, 1) * s5 - m(3, 2) * s4 + m(3, 3) * s3) * inv,
                (-m(2, 1) * s5 + m(2, 2) * s4 - m(2, 3) * s3) * inv,
            ],
            [
                (-m(1, 0) * c5 + m(1, 2) * c2 - m(1, 3) * c1) * inv,
                (m(0, 0) * c5 - m(0, 2) * c2 + m(0, 3) * c1) * inv,
                (-m(3, 0) * s5 + m(3, 2) * s2 - m(3, 3) * s1) * inv,
                (m(2, 0) * s5 - m(2, 2) * s2 + m(2, 3) * s1) * inv,
            ],
            [
                (m(1, 0) * c4 - m(1, 1) * c2 + m(1, 3) * c0) * inv,
                (-m(0, 0) * c4 + m(0, 1) * c2 - m(0, 3) * c0) * inv,
                (m(3, 0) * s4 - m(3, 1) * s2 + m(3, 3) * s0) * inv,
                (-m(2, 0) * s4 + m(2, 1) * s2 - m(2, 3) * s0) * inv,
            ],
            [
                (-m(1, 0) * c3 + m(1, 1) * c1 - m(1, 2) * c0) * inv,
                (m(0, 0) * c3 - m(0, 1) * c1 + m(0, 2) * c0) * inv,
                (-m(3, 0) * s3 + m(3, 1) * s1 - m(3, 2) * s0) * inv,
                (m(2, 0) * s3 - m(2, 1) * s1 + m(2, 2) * s0) * inv,
            ],
        ]))
    }

    /// Transforms a point (w = 1) and divides by the resulting w when it is
    /// neither 0 nor 1.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let v = *self * Vec4::from_vec3(p, 1.0);
        if v.w != 0.0 && v.w != 1.0 {
            v.perspective_divide()
        } else {
            v.to_vec3()
        }
    }

    /// Transforms a direction (w = 0); translation has no effect.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(v, 0.0)).to_vec3()
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// For column-major convention, `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        Mat4::from_cols(rhs.cols.map(|col| self * col))
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}
