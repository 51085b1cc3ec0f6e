//! Packed 32-bit ARGB colors.
//!
//! Colors travel through the pipeline as `u32` in `0xAARRGGBB` order and are
//! stored in bitmaps in native byte order, which matches an ARGB8888
//! presentation surface.

pub const BLACK: u32 = 0xFF00_0000;
pub const WHITE: u32 = 0xFFFF_FFFF;
pub const RED: u32 = 0xFFFF_0000;
pub const GREEN: u32 = 0xFF00_FF00;
pub const BLUE: u32 = 0xFF00_00FF;
pub const YELLOW: u32 = 0xFFFF_FF00;

/// Packs 8-bit channels into `0xAARRGGBB`.
#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Splits a packed color into `[a, r, g, b]`.
#[inline]
pub const fn channels(color: u32) -> [u8; 4] {
    [
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    ]
}

/// Channels scaled to `[0.0, 1.0]`, in `[a, r, g, b]` order.
#[inline]
pub fn unpack_color(color: u32) -> [f32; 4] {
    channels(color).map(|c| c as f32 / 255.0)
}

/// Packs `[0.0, 1.0]` channels, clamping out-of-range values.
#[inline]
pub fn pack_color(a: f32, r: f32, g: f32, b: f32) -> u32 {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
    argb(to_u8(a), to_u8(r), to_u8(g), to_u8(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_round_trips_through_channels() {
        let c = argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c, 0x1234_5678);
        assert_eq!(channels(c), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn pack_clamps() {
        assert_eq!(pack_color(2.0, 1.0, 0.0, -1.0), 0xFFFF_0000);
    }
}
