//! Pixel storage shared by assets and the presentation surface.
//!
//! A [`Bitmap`] is generic over its byte storage so the same compositing code
//! runs on owned images (`Vec<u8>`), borrowed views (`&[u8]`) and a live
//! window surface (`&mut [u8]`).

use std::path::Path;

use image::DynamicImage;

use crate::error::{Error, Result};
use crate::geometry::{Aabb, Rect};
use crate::math::Vec2;

/// `width x height` pixels of `channels` bytes each, rows packed without
/// padding.
///
/// Supported layouts are 1 channel (8-bit mask or glyph atlas) and
/// 4 channels (packed `0xAARRGGBB` in native byte order).
#[derive(Debug, Clone)]
pub struct Bitmap<B = Vec<u8>> {
    width: u32,
    height: u32,
    channels: u32,
    data: B,
}

impl<B: AsRef<[u8]>> Bitmap<B> {
    /// Wraps existing storage.
    ///
    /// Fails with [`Error::BufferTooSmall`] when `data` holds fewer than
    /// `width * height * channels` bytes. Extra trailing bytes are ignored.
    pub fn new(width: u32, height: u32, channels: u32, data: B) -> Result<Self> {
        let needed = width as usize * height as usize * channels as usize;
        let found = data.as_ref().len();
        if found < needed {
            return Err(Error::BufferTooSmall { needed, found });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.data
    }

    /// Rectangle covering the whole bitmap.
    pub fn rect(&self) -> Rect {
        Rect::covering(self.width, self.height)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            Vec2::ZERO,
            Vec2::new(self.width as f32, self.height as f32),
        )
    }

    /// Resolves an optional region to a box inside this bitmap.
    ///
    /// `None` means the whole bitmap. A region that sticks out of the bitmap
    /// is rejected with [`Error::RegionOutOfBounds`].
    pub fn region(&self, region: Option<&Rect>) -> Result<Aabb> {
        let Some(region) = region else {
            return Ok(self.aabb());
        };
        let aabb = region.aabb();
        if region.width < 0.0 || region.height < 0.0 || !self.aabb().contains(&aabb) {
            return Err(Error::RegionOutOfBounds);
        }
        Ok(aabb)
    }

    /// Fails with [`Error::UnsupportedChannels`] unless the bitmap has
    /// `expected` channels.
    pub fn require_channels(&self, expected: u32) -> Result<()> {
        if self.channels == expected {
            Ok(())
        } else {
            Err(Error::UnsupportedChannels {
                expected,
                found: self.channels,
            })
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.pitch() + x as usize * self.channels as usize
    }

    /// Packed color of a 4-channel pixel. `None` outside the bitmap or for
    /// other layouts.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height || self.channels != 4 {
            return None;
        }
        let i = self.offset(x, y);
        let bytes = self.data.as_ref().get(i..i + 4)?;
        Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// First byte of the pixel; the intensity for 1-channel bitmaps.
    #[inline]
    pub fn value(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.as_ref().get(self.offset(x, y)).copied()
    }

    /// Read-only view sharing this bitmap's bytes.
    pub fn view(&self) -> Bitmap<&[u8]> {
        Bitmap {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data.as_ref(),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Bitmap<B> {
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    /// Writes a packed color into a 4-channel pixel. Out-of-range
    /// coordinates are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if x >= self.width || y >= self.height || self.channels != 4 {
            return;
        }
        let i = self.offset(x, y);
        if let Some(bytes) = self.data.as_mut().get_mut(i..i + 4) {
            bytes.copy_from_slice(&color.to_ne_bytes());
        }
    }

    /// Writes an intensity into a 1-channel pixel.
    #[inline]
    pub fn set_value(&mut self, x: u32, y: u32, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        if let Some(byte) = self.data.as_mut().get_mut(i) {
            *byte = value;
        }
    }

    /// Sets every pixel of a 4-channel bitmap to `color`.
    pub fn clear(&mut self, color: u32) {
        if self.channels != 4 {
            return;
        }
        let bytes = color.to_ne_bytes();
        let len = self.pixel_count() * 4;
        for px in self.data.as_mut()[..len].chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Mutable view sharing this bitmap's bytes.
    pub fn view_mut(&mut self) -> Bitmap<&mut [u8]> {
        Bitmap {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data.as_mut(),
        }
    }
}

impl Bitmap<Vec<u8>> {
    /// Zero-filled bitmap.
    pub fn filled(width: u32, height: u32, channels: u32) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            data: vec![0; len],
        }
    }

    /// 4-channel bitmap from packed colors, row by row.
    pub fn from_argb(width: u32, height: u32, pixels: &[u32]) -> Result<Self> {
        let data: Vec<u8> = pixels.iter().flat_map(|p| p.to_ne_bytes()).collect();
        Self::new(width, height, 4, data)
    }

    /// Decodes an image file.
    ///
    /// 8-bit grayscale images become 1-channel bitmaps, everything else is
    /// converted to packed ARGB.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bitmap = Self::from_image(image::open(path)?)?;
        log::info!(
            "loaded bitmap {} ({}x{}, {} channel(s))",
            path.display(),
            bitmap.width,
            bitmap.height,
            bitmap.channels
        );
        Ok(bitmap)
    }

    pub fn from_image(img: DynamicImage) -> Result<Self> {
        match img {
            DynamicImage::ImageLuma8(gray) => {
                let (width, height) = gray.dimensions();
                Self::new(width, height, 1, gray.into_raw())
            }
            other => {
                let rgba = other.to_rgba8();
                let (width, height) = rgba.dimensions();
                let data: Vec<u8> = rgba
                    .pixels()
                    .flat_map(|p| {
                        let [r, g, b, a] = p.0;
                        crate::colors::argb(a, r, g, b).to_ne_bytes()
                    })
                    .collect();
                Self::new(width, height, 4, data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_storage() {
        let err = Bitmap::new(4, 4, 4, vec![0u8; 63]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                needed: 64,
                found: 63
            }
        ));
    }

    #[test]
    fn pixels_are_native_endian_argb() {
        let mut bm = Bitmap::filled(2, 2, 4);
        bm.set_pixel(1, 1, 0x8011_2233);
        assert_eq!(bm.pixel(1, 1), Some(0x8011_2233));
        assert_eq!(&bm.data()[12..16], &0x8011_2233u32.to_ne_bytes());
        assert_eq!(bm.pixel(2, 0), None);
    }

    #[test]
    fn region_must_fit() {
        let bm = Bitmap::filled(10, 10, 4);
        assert!(bm.region(None).is_ok());
        assert!(bm.region(Some(&Rect::from_top_left(2.0, 2.0, 8.0, 8.0))).is_ok());
        assert!(matches!(
            bm.region(Some(&Rect::from_top_left(4.0, 0.0, 8.0, 4.0))),
            Err(Error::RegionOutOfBounds)
        ));
    }

    #[test]
    fn views_share_storage() {
        let mut bm = Bitmap::filled(3, 1, 4);
        bm.view_mut().set_pixel(2, 0, 0xFFFF_FFFF);
        assert_eq!(bm.view().pixel(2, 0), Some(0xFFFF_FFFF));
    }

    #[test]
    fn grayscale_images_stay_single_channel() {
        let gray = image::GrayImage::from_raw(2, 1, vec![10, 200]).unwrap();
        let bm = Bitmap::from_image(DynamicImage::ImageLuma8(gray)).unwrap();
        assert_eq!(bm.channels(), 1);
        assert_eq!(bm.value(1, 0), Some(200));

        let rgba = image::RgbaImage::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
        let bm = Bitmap::from_image(DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(bm.pixel(0, 0), Some(0x0401_0203));
    }
}
