//! Frame buffer abstraction for rasterization.
//!
//! Bundles the destination bitmap, an optional depth plane and the clip box
//! triangles are bounded against.

use super::depth::DepthBuffer;
use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::geometry::{Aabb, Rect};

/// A view into a 4-channel color bitmap and its depth plane.
///
/// This is a borrowed view, not an owning type: it is built for one
/// rasterization pass over a destination that lives elsewhere (an owned
/// bitmap, or the window surface).
///
/// # Depth
///
/// With a depth plane, fragments pass only when nearer than the stored value
/// (see [`DepthBuffer`]). Without one, every covered pixel is written; this
/// is how plain 2D triangles are drawn.
pub struct FrameBuffer<'a> {
    color: Bitmap<&'a mut [u8]>,
    depth: Option<DepthBuffer<'a>>,
    clip: Aabb,
}

impl<'a> FrameBuffer<'a> {
    /// Creates a frame buffer covering the whole destination.
    ///
    /// # Errors
    /// * [`Error::UnsupportedChannels`] if `color` is not 4-channel
    /// * [`Error::DepthSizeMismatch`] if the depth plane has other dimensions
    pub fn new(color: Bitmap<&'a mut [u8]>, depth: Option<DepthBuffer<'a>>) -> Result<Self> {
        color.require_channels(4)?;
        if let Some(depth) = &depth {
            if depth.width() != color.width() || depth.height() != color.height() {
                return Err(Error::DepthSizeMismatch {
                    expected: color.pixel_count(),
                    found: depth.as_slice().len(),
                });
            }
        }
        let clip = color.aabb();
        Ok(Self { color, depth, clip })
    }

    /// Restricts drawing to `region`, which must lie inside the destination.
    /// `None` keeps the whole destination.
    pub fn with_region(mut self, region: Option<&Rect>) -> Result<Self> {
        self.clip = self.color.region(region)?;
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    /// Box every rasterized triangle is intersected with.
    pub fn clip(&self) -> Aabb {
        self.clip
    }

    pub fn depth(&self) -> Option<&DepthBuffer<'a>> {
        self.depth.as_ref()
    }

    pub fn color(&self) -> &Bitmap<&'a mut [u8]> {
        &self.color
    }

    /// Runs the depth test for a fragment, storing its depth on success.
    ///
    /// Always passes when there is no depth plane.
    #[inline]
    pub fn depth_test(&mut self, x: i32, y: i32, depth: f32) -> bool {
        match &mut self.depth {
            Some(plane) => plane.test_and_set(x, y, depth),
            None => true,
        }
    }

    /// Set a pixel at (x, y) with depth testing.
    ///
    /// # Arguments
    /// * `x`, `y` - Pixel coordinates
    /// * `depth` - Post-divide depth (larger = closer)
    /// * `color` - The color to write if the depth test passes
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: u32) {
        if self.depth_test(x, y, depth) {
            self.set_pixel(x, y, color);
        }
    }

    /// Set a pixel without depth testing. Ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 {
            self.color.set_pixel(x as u32, y as u32, color);
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x >= 0 && y >= 0 {
            self.color.pixel(x as u32, y as u32)
        } else {
            None
        }
    }
}
