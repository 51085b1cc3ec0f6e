//! Bitmap fonts baked with fontdue.
//!
//! [`Font`] rasterizes the printable ASCII range once into a 1-channel atlas
//! [`Bitmap`] and remembers where each glyph landed. Text is drawn by
//! blitting glyph rectangles out of the atlas in glyph mode, so the glyph's
//! coverage modulates the text color.

use std::collections::HashMap;
use std::path::Path;

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::math::Vec2;
use crate::render::blit::blit;

// ── atlas constants ────────────────────────────────────────────────────────

const ATLAS_WIDTH: u32 = 512;
const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas
const FIRST_CHAR: u8 = b' ';
const LAST_CHAR: u8 = b'~';

// ── glyph ──────────────────────────────────────────────────────────────────

/// Where a baked glyph lives in the atlas and how it sits on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Glyph rectangle in atlas pixels. Zero-sized for blank glyphs.
    pub rect: Rect,
    /// Offset from the pen position (on the baseline) to the glyph's
    /// top-left corner, y down.
    pub offset: Vec2,
    /// Horizontal pen advance in pixels.
    pub advance: f32,
}

// ── font ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Font {
    atlas: Bitmap,
    glyphs: HashMap<char, Glyph>,
    size: f32,
    ascent: f32,
    line_height: f32,
}

impl Font {
    /// Parses a TrueType or OpenType font and bakes it at `size` pixels.
    pub fn from_bytes(bytes: &[u8], size: f32) -> Result<Self> {
        let settings = fontdue::FontSettings {
            scale: size,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings).map_err(|e| Error::Font(e.to_string()))?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (FIRST_CHAR..=LAST_CHAR)
            .map(char::from)
            .map(|c| {
                let (metrics, coverage) = font.rasterize(c, size);
                (c, metrics, coverage)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let (positions, atlas_height) = pack_shelves(&sizes, ATLAS_WIDTH)?;

        let mut atlas = Bitmap::filled(ATLAS_WIDTH, atlas_height, 1);
        let mut glyphs = HashMap::with_capacity(rasterized.len());
        for ((c, metrics, coverage), (x, y)) in rasterized.iter().zip(positions) {
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let value = coverage[row * metrics.width + col];
                    atlas.set_value(x + col as u32, y + row as u32, value);
                }
            }
            glyphs.insert(
                *c,
                Glyph {
                    rect: Rect::from_top_left(
                        x as f32,
                        y as f32,
                        metrics.width as f32,
                        metrics.height as f32,
                    ),
                    offset: Vec2::new(
                        metrics.xmin as f32,
                        -(metrics.ymin as f32 + metrics.height as f32),
                    ),
                    advance: metrics.advance_width,
                },
            );
        }

        let (ascent, line_height) = font
            .horizontal_line_metrics(size)
            .map(|m| (m.ascent, m.new_line_size))
            .unwrap_or((size, size));

        Ok(Self::from_parts(atlas, glyphs, size, ascent, line_height))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let font = Self::from_bytes(&bytes, size)?;
        log::info!(
            "loaded font {} at {size}px: {} glyphs, {}x{} atlas",
            path.display(),
            font.glyphs.len(),
            font.atlas.width(),
            font.atlas.height()
        );
        Ok(font)
    }

    /// Builds a font from an already baked atlas.
    pub fn from_parts(
        atlas: Bitmap,
        glyphs: HashMap<char, Glyph>,
        size: f32,
        ascent: f32,
        line_height: f32,
    ) -> Self {
        Self {
            atlas,
            glyphs,
            size,
            ascent,
            line_height,
        }
    }

    pub fn atlas(&self) -> &Bitmap {
        &self.atlas
    }

    /// Glyph for `c`, falling back to `?` for characters that were not baked.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c).or_else(|| self.glyphs.get(&'?'))
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Width of `text` when drawn on one line.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .filter_map(|c| self.glyph(c))
            .map(|g| g.advance)
            .sum()
    }
}

/// Places boxes left to right in rows of `width` pixels, starting a new row
/// when one doesn't fit. Returns each box's top-left corner and the total
/// height used.
fn pack_shelves(sizes: &[(u32, u32)], width: u32) -> Result<(Vec<(u32, u32)>, u32)> {
    let mut cursor_x = GLYPH_PADDING;
    let mut cursor_y = GLYPH_PADDING;
    let mut row_height = 0;
    let mut positions = Vec::with_capacity(sizes.len());

    for &(w, h) in sizes {
        if w + 2 * GLYPH_PADDING > width {
            return Err(Error::Font(format!(
                "glyph {w}px wide does not fit a {width}px atlas"
            )));
        }
        // Advance to a new shelf row when the glyph doesn't fit horizontally.
        if cursor_x + w + GLYPH_PADDING > width {
            cursor_y += row_height + GLYPH_PADDING;
            cursor_x = GLYPH_PADDING;
            row_height = 0;
        }
        positions.push((cursor_x, cursor_y));
        cursor_x += w + GLYPH_PADDING;
        row_height = row_height.max(h);
    }

    Ok((positions, cursor_y + row_height + GLYPH_PADDING))
}

// ── drawing ────────────────────────────────────────────────────────────────

/// Draws one character with its pen on the baseline at `pen` and returns
/// the pen advance.
pub fn draw_char<B>(
    dst: &mut Bitmap<B>,
    region: Option<&Rect>,
    font: &Font,
    c: char,
    color: u32,
    pen: Vec2,
) -> Result<f32>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let Some(glyph) = font.glyph(c) else {
        return Ok(0.0);
    };
    if glyph.rect.width > 0.0 && glyph.rect.height > 0.0 {
        let half = Vec2::new(glyph.rect.width, glyph.rect.height) / 2.0;
        let center = pen + glyph.offset + half;
        blit(dst, region, &font.atlas, Some(&glyph.rect), center, color)?;
    }
    Ok(glyph.advance)
}

/// Draws `text` on one line starting at `pen` and returns the drawn width.
pub fn draw_text<B>(
    dst: &mut Bitmap<B>,
    region: Option<&Rect>,
    font: &Font,
    text: &str,
    color: u32,
    pen: Vec2,
) -> Result<f32>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let mut x = pen.x;
    for c in text.chars() {
        x += draw_char(dst, region, font, c, color, Vec2::new(x, pen.y))?;
    }
    Ok(x - pen.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;

    /// A font with one solid 2x3 glyph `#` and a blank space.
    fn block_font() -> Font {
        let mut atlas = Bitmap::filled(8, 8, 1);
        for y in 1..4 {
            for x in 1..3 {
                atlas.set_value(x, y, 255);
            }
        }
        let mut glyphs = HashMap::new();
        glyphs.insert(
            '#',
            Glyph {
                rect: Rect::from_top_left(1.0, 1.0, 2.0, 3.0),
                offset: Vec2::new(1.0, -3.0),
                advance: 4.0,
            },
        );
        glyphs.insert(
            ' ',
            Glyph {
                rect: Rect::from_top_left(0.0, 0.0, 0.0, 0.0),
                offset: Vec2::ZERO,
                advance: 2.0,
            },
        );
        Font::from_parts(atlas, glyphs, 4.0, 3.0, 5.0)
    }

    fn lit(bitmap: &Bitmap) -> Vec<(u32, u32)> {
        (0..bitmap.height())
            .flat_map(|y| (0..bitmap.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| bitmap.pixel(x, y) != Some(0))
            .collect()
    }

    #[test]
    fn shelves_wrap_and_pad() {
        let (positions, height) = pack_shelves(&[(4, 2), (4, 5), (3, 1)], 12).unwrap();
        assert_eq!(positions, vec![(1, 1), (6, 1), (1, 7)]);
        assert_eq!(height, 9);
    }

    #[test]
    fn oversized_glyph_is_an_error() {
        assert!(matches!(pack_shelves(&[(20, 2)], 16), Err(Error::Font(_))));
    }

    #[test]
    fn glyph_sits_on_the_baseline() {
        let font = block_font();
        let mut dst = Bitmap::filled(16, 8, 4);
        let advance = draw_char(&mut dst, None, &font, '#', colors::WHITE, Vec2::new(2.0, 5.0)).unwrap();

        assert_eq!(advance, 4.0);
        // Top-left at pen + offset = (3, 2), 2 wide and 3 tall.
        let expected: Vec<(u32, u32)> = (2..5).flat_map(|y| (3..5).map(move |x| (x, y))).collect();
        assert_eq!(lit(&dst), expected);
        assert_eq!(dst.pixel(3, 2), Some(colors::WHITE));
    }

    #[test]
    fn text_advances_and_falls_back() {
        let font = block_font();
        let mut dst = Bitmap::filled(32, 8, 4);
        let width = draw_text(&mut dst, None, &font, "# #", colors::RED, Vec2::new(0.0, 4.0)).unwrap();
        assert_eq!(width, 10.0);
        assert_eq!(font.measure("# #"), 10.0);
        // Two glyphs, six pixels each.
        assert_eq!(lit(&dst).len(), 12);
        // No '?' in the font: unknown characters draw nothing.
        assert!(font.glyph('x').is_none());
    }
}
