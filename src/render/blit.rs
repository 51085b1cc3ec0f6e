//! Compositing primitives: solid fills, bitmap blits and rectangle outlines.
//!
//! Every primitive takes an optional destination region. `None` means the
//! whole destination; otherwise the region must lie inside the destination
//! and nothing outside it is touched. Geometry is clipped to the region and
//! an empty overlap is a silent no-op.
//!
//! Pixels follow the half-open coverage rule of [`Aabb::pixel_span`].

use crate::bitmap::Bitmap;
use crate::colors::{channels, unpack_color};
use crate::error::{Error, Result};
use crate::geometry::{Aabb, PixelSpan, Rect};
use crate::math::{lerp, Vec2};

/// Pixels of `shape` inside the clip box, or `None` when they do not meet.
fn clipped_span(shape: &Aabb, clip: &Aabb) -> Option<PixelSpan> {
    if !shape.intersects(clip) {
        return None;
    }
    let span = shape.intersection(clip).pixel_span();
    (!span.is_empty()).then_some(span)
}

/// Fills `rect` with `color`, clipped to the destination region.
///
/// # Errors
/// * [`Error::UnsupportedChannels`] unless `dst` has 4 channels
/// * [`Error::RegionOutOfBounds`] if `region` is not inside `dst`
pub fn fill_rect<B>(dst: &mut Bitmap<B>, region: Option<&Rect>, color: u32, rect: &Rect) -> Result<()>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    dst.require_channels(4)?;
    let clip = dst.region(region)?;
    let Some(span) = clipped_span(&rect.aabb(), &clip) else {
        return Ok(());
    };

    let pitch = dst.pitch();
    let bytes = color.to_ne_bytes();
    let data = dst.data_mut();
    for y in span.y0..span.y1 {
        let start = y as usize * pitch + span.x0 as usize * 4;
        let end = start + span.width() * 4;
        for px in data[start..end].chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }
    Ok(())
}

/// Draws a one pixel border around the part of `aabb` inside the region.
///
/// The border runs along the first and last covered row and column.
pub fn draw_rect_outline<B>(
    dst: &mut Bitmap<B>,
    region: Option<&Rect>,
    aabb: &Aabb,
    color: u32,
) -> Result<()>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    dst.require_channels(4)?;
    let clip = dst.region(region)?;
    let Some(span) = clipped_span(aabb, &clip) else {
        return Ok(());
    };

    let (left, right) = (span.x0 as u32, (span.x1 - 1) as u32);
    let (top, bottom) = (span.y0 as u32, (span.y1 - 1) as u32);
    for x in left..=right {
        dst.set_pixel(x, top, color);
        dst.set_pixel(x, bottom, color);
    }
    for y in top..=bottom {
        dst.set_pixel(left, y, color);
        dst.set_pixel(right, y, color);
    }
    Ok(())
}

/// How source samples combine with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlendMode {
    /// 4 -> 4: source alpha times tint alpha, colors multiplied by the tint.
    Color,
    /// 1 -> 4: the intensity is both coverage and brightness of the tint.
    Glyph,
    /// 1 -> 1: blend intensities by the tint alpha.
    Mask,
}

impl BlendMode {
    fn for_channels(src: u32, dst: u32) -> Result<Self> {
        match (src, dst) {
            (4, 4) => Ok(BlendMode::Color),
            (1, 4) => Ok(BlendMode::Glyph),
            (1, 1) => Ok(BlendMode::Mask),
            _ => Err(Error::UnsupportedBlit {
                src_channels: src,
                dst_channels: dst,
            }),
        }
    }
}

/// Composites `src` onto `dst`.
///
/// `src_region` (default: all of `src`) is placed with its center at
/// `position` in destination coordinates and clipped against the
/// destination region. `tint` is a packed ARGB multiplier; `0xFFFFFFFF`
/// leaves the source unchanged.
///
/// Channels are blended in float and truncated to 8 bits:
/// `out = lerp(dst, src * tint, alpha)`, with the destination alpha moving
/// towards opaque by the same factor.
///
/// # Errors
/// * [`Error::UnsupportedBlit`] for pairings other than 4->4, 1->4, 1->1
/// * [`Error::RegionOutOfBounds`] if either region is outside its bitmap
pub fn blit<D, S>(
    dst: &mut Bitmap<D>,
    region: Option<&Rect>,
    src: &Bitmap<S>,
    src_region: Option<&Rect>,
    position: Vec2,
    tint: u32,
) -> Result<()>
where
    D: AsRef<[u8]> + AsMut<[u8]>,
    S: AsRef<[u8]>,
{
    let mode = BlendMode::for_channels(src.channels(), dst.channels())?;
    let src_box = src.region(src_region)?;
    let clip = dst.region(region)?;

    let placed = Aabb::from_center_size(position, Vec2::new(src_box.width(), src_box.height()));
    let Some(span) = clipped_span(&placed, &clip) else {
        return Ok(());
    };

    let [tint_a, tint_r, tint_g, tint_b] = unpack_color(tint);
    let offset = src_box.min - placed.min;
    let src_span = src_box.pixel_span();

    for y in span.y0..span.y1 {
        let sy = (y as f32 + offset.y).floor() as i32;
        if sy < src_span.y0 || sy >= src_span.y1 {
            continue;
        }
        for x in span.x0..span.x1 {
            let sx = (x as f32 + offset.x).floor() as i32;
            if sx < src_span.x0 || sx >= src_span.x1 {
                continue;
            }
            let (sx, sy, dx, dy) = (sx as u32, sy as u32, x as u32, y as u32);

            match mode {
                BlendMode::Color => {
                    let (Some(s), Some(d)) = (src.pixel(sx, sy), dst.pixel(dx, dy)) else {
                        continue;
                    };
                    let [sa, sr, sg, sb] = channels(s).map(f32::from);
                    let alpha = sa / 255.0 * tint_a;
                    let out = composite(d, [sr * tint_r, sg * tint_g, sb * tint_b], alpha);
                    dst.set_pixel(dx, dy, out);
                }
                BlendMode::Glyph => {
                    let (Some(i), Some(d)) = (src.value(sx, sy), dst.pixel(dx, dy)) else {
                        continue;
                    };
                    let i = f32::from(i);
                    let alpha = i / 255.0 * tint_a;
                    let out = composite(d, [i * tint_r, i * tint_g, i * tint_b], alpha);
                    dst.set_pixel(dx, dy, out);
                }
                BlendMode::Mask => {
                    let (Some(i), Some(d)) = (src.value(sx, sy), dst.value(dx, dy)) else {
                        continue;
                    };
                    let out = lerp(f32::from(d), f32::from(i), tint_a) as u8;
                    dst.set_value(dx, dy, out);
                }
            }
        }
    }
    Ok(())
}

/// Blends straight `rgb` (0..=255 floats) over a packed destination color.
#[inline]
fn composite(dst: u32, rgb: [f32; 3], alpha: f32) -> u32 {
    let [da, dr, dg, db] = channels(dst).map(f32::from);
    let a = lerp(da, 255.0, alpha) as u8;
    let r = lerp(dr, rgb[0], alpha) as u8;
    let g = lerp(dg, rgb[1], alpha) as u8;
    let b = lerp(db, rgb[2], alpha) as u8;
    crate::colors::argb(a, r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(bitmap: &Bitmap, color: u32) -> usize {
        (0..bitmap.height())
            .flat_map(|y| (0..bitmap.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| bitmap.pixel(x, y) == Some(color))
            .count()
    }

    #[test]
    fn fill_rect_is_clipped_to_the_region() {
        let mut dst = Bitmap::filled(16, 16, 4);
        let region = Rect::from_top_left(4.0, 4.0, 8.0, 8.0);
        let rect = Rect::from_top_left(0.0, 0.0, 10.0, 10.0);

        fill_rect(&mut dst, Some(&region), 0xFFAB_CDEF, &rect).unwrap();

        assert_eq!(count(&dst, 0xFFAB_CDEF), 6 * 6);
        assert_eq!(dst.pixel(3, 4), Some(0));
        assert_eq!(dst.pixel(4, 4), Some(0xFFAB_CDEF));
        assert_eq!(dst.pixel(10, 10), Some(0));
    }

    #[test]
    fn fill_rect_outside_is_a_no_op() {
        let mut dst = Bitmap::filled(4, 4, 4);
        fill_rect(&mut dst, None, 0xFFFF_FFFF, &Rect::from_top_left(10.0, 10.0, 2.0, 2.0)).unwrap();
        assert!(dst.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_rect_needs_four_channels() {
        let mut mask = Bitmap::filled(4, 4, 1);
        let rect = mask.rect();
        let err = fill_rect(&mut mask, None, 0, &rect).unwrap_err();
        assert!(matches!(err, Error::UnsupportedChannels { .. }));
    }

    #[test]
    fn opaque_blit_copies_exactly() {
        let pixels: Vec<u32> = (0..12).map(|i| 0xFF00_0000 | (i * 0x0102_03)).collect();
        let src = Bitmap::from_argb(4, 3, &pixels).unwrap();
        let mut dst = Bitmap::filled(8, 8, 4);
        dst.clear(0xFF10_2030);

        blit(&mut dst, None, &src, None, Vec2::new(4.0, 3.5), 0xFFFF_FFFF).unwrap();

        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(dst.pixel(x + 2, y + 2), src.pixel(x, y));
            }
        }
        assert_eq!(dst.pixel(1, 2), Some(0xFF10_2030));
        assert_eq!(dst.pixel(6, 2), Some(0xFF10_2030));
    }

    #[test]
    fn blit_sub_region_and_clipping() {
        let pixels: Vec<u32> = (0..16).map(|i| 0xFF00_0000 | i).collect();
        let src = Bitmap::from_argb(4, 4, &pixels).unwrap();
        let mut dst = Bitmap::filled(4, 4, 4);

        // Bottom-right 2x2 of the source, centered on the destination's
        // top-left corner: only its last pixel lands.
        let sub = Rect::from_top_left(2.0, 2.0, 2.0, 2.0);
        blit(&mut dst, None, &src, Some(&sub), Vec2::ZERO, 0xFFFF_FFFF).unwrap();

        assert_eq!(dst.pixel(0, 0), Some(0xFF00_000F));
        assert_eq!(count(&dst, 0), 15);
    }

    #[test]
    fn transparent_tint_leaves_destination() {
        let src = Bitmap::from_argb(1, 1, &[0xFFFF_FFFF]).unwrap();
        let mut dst = Bitmap::from_argb(1, 1, &[0xFF11_2233]).unwrap();
        blit(&mut dst, None, &src, None, Vec2::new(0.5, 0.5), 0x00FF_FFFF).unwrap();
        assert_eq!(dst.pixel(0, 0), Some(0xFF11_2233));
    }

    #[test]
    fn glyph_blit_modulates_tint() {
        let glyph = Bitmap::new(2, 1, 1, vec![255u8, 0]).unwrap();
        let mut dst = Bitmap::from_argb(2, 1, &[0xFF00_0000, 0xFF00_0000]).unwrap();
        blit(&mut dst, None, &glyph, None, Vec2::new(1.0, 0.5), 0xFFFF_0000).unwrap();

        assert_eq!(dst.pixel(0, 0), Some(0xFFFF_0000));
        assert_eq!(dst.pixel(1, 0), Some(0xFF00_0000));
    }

    #[test]
    fn mask_blit_lerps_by_tint_alpha() {
        let src = Bitmap::new(1, 1, 1, vec![200u8]).unwrap();
        let mut dst = Bitmap::new(1, 1, 1, vec![100u8]).unwrap();
        blit(&mut dst, None, &src, None, Vec2::new(0.5, 0.5), 0x8000_0000).unwrap();
        let v = dst.value(0, 0).unwrap();
        assert!((149..=151).contains(&v), "{v}");
    }

    #[test]
    fn unsupported_pairing_is_rejected() {
        let src = Bitmap::filled(1, 1, 4);
        let mut dst = Bitmap::filled(1, 1, 1);
        let err = blit(&mut dst, None, &src, None, Vec2::ZERO, 0xFFFF_FFFF).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedBlit {
                src_channels: 4,
                dst_channels: 1
            }
        ));
    }

    #[test]
    fn region_outside_destination_is_rejected() {
        let src = Bitmap::filled(1, 1, 4);
        let mut dst = Bitmap::filled(4, 4, 4);
        let region = Rect::from_top_left(2.0, 2.0, 4.0, 4.0);
        let err = blit(&mut dst, Some(&region), &src, None, Vec2::ZERO, 0).unwrap_err();
        assert!(matches!(err, Error::RegionOutOfBounds));
    }

    #[test]
    fn outline_draws_only_the_border() {
        let mut dst = Bitmap::filled(8, 8, 4);
        let aabb = Aabb::new(Vec2::new(1.0, 1.0), Vec2::new(6.0, 5.0));
        draw_rect_outline(&mut dst, None, &aabb, 0xFFFF_FFFF).unwrap();

        // 5x4 box: 2*5 + 2*2 border pixels.
        assert_eq!(count(&dst, 0xFFFF_FFFF), 14);
        assert_eq!(dst.pixel(1, 1), Some(0xFFFF_FFFF));
        assert_eq!(dst.pixel(5, 4), Some(0xFFFF_FFFF));
        assert_eq!(dst.pixel(6, 4), Some(0));
        assert_eq!(dst.pixel(3, 2), Some(0));
    }
}
