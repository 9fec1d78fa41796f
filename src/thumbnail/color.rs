//! Colour parsing, interpolation and the small geometry type used for text boxes.

use image::{Pixel, Rgb, RgbImage, Rgba};

/// Parses `#RRGGBB`, `RRGGBB` or `#RGB`.
pub fn parse_hex(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
        }
        3 => {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 1], 16)
                    .ok()
                    .map(|nibble| nibble * 17)
            };
            Some(Rgb([channel(0)?, channel(1)?, channel(2)?]))
        }
        _ => None,
    }
}

/// Linear interpolation between two colours, truncating toward `start`.
pub fn lerp(start: Rgb<u8>, end: Rgb<u8>, t: f64) -> Rgb<u8> {
    let channel = |i: usize| {
        let a = f64::from(start[i]);
        let b = f64::from(end[i]);
        (a + (b - a) * t).trunc().clamp(0.0, 255.0) as u8
    };
    Rgb([channel(0), channel(1), channel(2)])
}

/// Composites `color` at `alpha` over an opaque pixel (source-over).
pub fn blend_over(pixel: &mut Rgb<u8>, color: Rgb<u8>, alpha: u8) {
    let mut base = pixel.to_rgba();
    base.blend(&Rgba([color[0], color[1], color[2], alpha]));
    *pixel = base.to_rgb();
}

/// Fills a new canvas with a vertical gradient, one row at a time.
pub fn vertical_gradient(width: u32, height: u32, start: Rgb<u8>, end: Rgb<u8>) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    for (y, row) in canvas.enumerate_rows_mut() {
        let color = lerp(start, end, f64::from(y) / f64::from(height));
        for (_, _, pixel) in row {
            *pixel = color;
        }
    }
    canvas
}

/// An ink bounding box relative to a draw origin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextBox {
    /// Offset of the leftmost ink column from the origin.
    pub left: i32,
    /// Offset of the topmost ink row from the origin.
    pub top: i32,
    /// Ink width.
    pub width: u32,
    /// Ink height.
    pub height: u32,
}

impl TextBox {
    /// Exclusive right edge relative to the origin.
    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    /// Exclusive bottom edge relative to the origin.
    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    /// Grows the box by `radius` pixels on every side.
    pub fn inflate(&self, radius: u32) -> Self {
        Self {
            left: self.left - radius as i32,
            top: self.top - radius as i32,
            width: self.width + 2 * radius,
            height: self.height + 2 * radius,
        }
    }
}
