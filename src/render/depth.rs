//! Per-pixel depth plane.
//!
//! Depth values are post-divide depths from the reverse-Z projection: 1.0 at
//! the near plane, 0.0 at the far plane. Nearer surfaces carry larger values,
//! so a fragment survives when its depth is strictly greater than the stored
//! one and an empty plane holds [`DepthBuffer::FAR`].

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};

/// Borrowed view of a depth plane with one `f32` per destination pixel.
#[derive(Debug)]
pub struct DepthBuffer<'a> {
    data: &'a mut [f32],
    width: u32,
    height: u32,
}

impl<'a> DepthBuffer<'a> {
    /// Depth of an empty pixel. Anything in front of the far plane beats it.
    pub const FAR: f32 = 0.0;

    /// Wraps `data` as a `width x height` plane.
    ///
    /// The length must match exactly, otherwise the plane could not line up
    /// with the destination it guards.
    pub fn new(data: &'a mut [f32], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::DepthSizeMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_slice(&self) -> &[f32] {
        self.data
    }

    /// Resets every pixel to [`DepthBuffer::FAR`].
    pub fn clear(&mut self) {
        self.data.fill(Self::FAR);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Stores `depth` if it is nearer than the current value.
    ///
    /// Returns whether the fragment passed. Out-of-bounds pixels never pass.
    #[inline]
    pub fn test_and_set(&mut self, x: i32, y: i32, depth: f32) -> bool {
        match self.index(x, y) {
            Some(i) if depth > self.data[i] => {
                self.data[i] = depth;
                true
            }
            _ => false,
        }
    }

    /// Paints the plane as grayscale into a 4-channel bitmap of the same
    /// size, nearest surface white and empty pixels black.
    ///
    /// Values are rescaled between the smallest and largest written depth,
    /// since reverse-Z packs most of the scene close to zero.
    pub fn visualize<B>(&self, dst: &mut Bitmap<B>) -> Result<()>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        dst.require_channels(4)?;
        if dst.width() != self.width || dst.height() != self.height {
            return Err(Error::DepthSizeMismatch {
                expected: dst.pixel_count(),
                found: self.data.len(),
            });
        }

        let (lo, hi) = self
            .data
            .iter()
            .filter(|d| **d > Self::FAR)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        let range = if hi > lo { hi - lo } else { 1.0 };

        for y in 0..self.height {
            for x in 0..self.width {
                let d = self.data[y as usize * self.width as usize + x as usize];
                let level = if d > Self::FAR {
                    (64.0 + (d - lo) / range * 191.0) as u8
                } else {
                    0
                };
                dst.set_pixel(x, y, crate::colors::argb(0xFF, level, level, level));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_must_match() {
        let mut data = vec![0.0; 11];
        assert!(matches!(
            DepthBuffer::new(&mut data, 4, 3),
            Err(Error::DepthSizeMismatch {
                expected: 12,
                found: 11
            })
        ));
    }

    #[test]
    fn nearer_fragments_win() {
        let mut data = vec![DepthBuffer::FAR; 4];
        let mut depth = DepthBuffer::new(&mut data, 2, 2).unwrap();

        assert!(depth.test_and_set(1, 0, 0.5));
        assert!(!depth.test_and_set(1, 0, 0.25));
        assert!(!depth.test_and_set(1, 0, 0.5));
        assert!(depth.test_and_set(1, 0, 0.75));
        assert_eq!(depth.get(1, 0), Some(0.75));
        assert!(!depth.test_and_set(2, 0, 1.0));
    }

    #[test]
    fn far_plane_depth_never_passes() {
        let mut data = vec![DepthBuffer::FAR; 1];
        let mut depth = DepthBuffer::new(&mut data, 1, 1).unwrap();
        assert!(!depth.test_and_set(0, 0, 0.0));
    }

    #[test]
    fn visualize_marks_empty_pixels_black() {
        let mut data = vec![0.0, 0.2, 0.9, 0.0];
        let depth = DepthBuffer::new(&mut data, 2, 2).unwrap();
        let mut out = Bitmap::filled(2, 2, 4);
        depth.visualize(&mut out).unwrap();

        assert_eq!(out.pixel(0, 0), Some(0xFF00_0000));
        assert_eq!(out.pixel(0, 1), Some(0xFFFF_FFFF));
        let [_, mid, _, _] = crate::colors::channels(out.pixel(1, 0).unwrap());
        assert_eq!(mid, 64);
    }
}
