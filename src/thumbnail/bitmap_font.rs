//! The built-in face, drawn from the `font8x8` glyph tables. Used when no
//! font file can be loaded.
//!
//! Glyphs come from the basic Latin table, then Latin-1. Turkish letters
//! outside Latin-1 fold to their base letter; anything else becomes `?`.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{GrayImage, Luma};

use super::color::TextBox;
use super::text::{Face, GlyphMask};
use crate::constants::MIN_FONT_SIZE;

/// Glyphs are 8x8 cells, spacing included.
const GLYPH_CELLS: u32 = 8;

fn fold(ch: char) -> char {
    match ch {
        'Ğ' => 'G',
        'ğ' => 'g',
        'İ' => 'I',
        'ı' => 'i',
        'Ş' => 'S',
        'ş' => 's',
        _ => ch,
    }
}

fn glyph(ch: char) -> [u8; 8] {
    let ch = fold(ch);
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}

/// The built-in face. Size maps to whole-pixel cells, so it scales in steps.
#[derive(Clone, Copy, Debug)]
pub struct BitmapFace {
    size: f32,
}

impl BitmapFace {
    /// A face at the given nominal pixel size.
    pub fn new(size: f32) -> Self {
        Self {
            size: size.max(MIN_FONT_SIZE),
        }
    }

    fn cell(&self) -> u32 {
        ((self.size / GLYPH_CELLS as f32).floor() as u32).max(1)
    }

    /// Grid coordinates of every inked cell, glyphs laid side by side.
    fn inked_cells(text: &str) -> Vec<(u32, u32)> {
        // Combining marks left over from case mapping carry no ink of their own.
        text.chars()
            .filter(|ch| !('\u{0300}'..='\u{036F}').contains(ch))
            .enumerate()
            .flat_map(|(index, ch)| {
                let origin = index as u32 * GLYPH_CELLS;
                glyph(ch)
                    .into_iter()
                    .enumerate()
                    .flat_map(move |(row, bits)| {
                        (0..GLYPH_CELLS)
                            .filter(move |column| (bits >> column) & 1 == 1)
                            .map(move |column| (origin + column, row as u32))
                    })
            })
            .collect()
    }
}

impl Face for BitmapFace {
    fn size(&self) -> f32 {
        self.size
    }

    fn resized(&self, size: f32) -> Box<dyn Face> {
        Box::new(Self::new(size))
    }

    fn rasterize(&self, text: &str) -> GlyphMask {
        let cells = Self::inked_cells(text);
        let (Some(x0), Some(y0), Some(x1), Some(y1)) = (
            cells.iter().map(|(x, _)| *x).min(),
            cells.iter().map(|(_, y)| *y).min(),
            cells.iter().map(|(x, _)| *x).max(),
            cells.iter().map(|(_, y)| *y).max(),
        ) else {
            return GlyphMask::empty();
        };

        let cell = self.cell();
        let bounds = TextBox {
            left: (x0 * cell) as i32,
            top: (y0 * cell) as i32,
            width: (x1 - x0 + 1) * cell,
            height: (y1 - y0 + 1) * cell,
        };
        let mut coverage = GrayImage::new(bounds.width, bounds.height);
        for (x, y) in cells {
            let (left, top) = ((x - x0) * cell, (y - y0) * cell);
            for py in top..top + cell {
                for px in left..left + cell {
                    coverage.put_pixel(px, py, Luma([255]));
                }
            }
        }
        GlyphMask::new(bounds, coverage)
    }
}
