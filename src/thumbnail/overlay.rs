//! Legibility overlay: a vertical colour gradient whose opacity is lowest at
//! the vertical centre and rises toward the top and bottom edges.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage, imageops};

use super::color::lerp;
use crate::design::ColorSpec;

/// Opacity never exceeds this, so some of the photo always shows through.
pub const MAX_OVERLAY_ALPHA: f64 = 0.92;

/// How strongly distance from the centre row raises the opacity.
const EDGE_BOOST: f64 = 3.0 * 0.22;

/// Overlay colour and 0-255 alpha for row `y` of a `height`-row canvas.
pub fn row_tint(colors: &ColorSpec, y: u32, height: u32) -> (Rgb<u8>, u8) {
    let t = f64::from(y) / f64::from(height);
    let color = lerp(colors.overlay_start, colors.overlay_end, t);
    let opacity =
        (f64::from(colors.overlay_opacity) + (0.5 - t).abs() * EDGE_BOOST).min(MAX_OVERLAY_ALPHA);
    let alpha = (255.0 * opacity).floor().clamp(0.0, 255.0) as u8;
    (color, alpha)
}

/// The overlay as its own RGBA layer, one flat tint per row.
pub fn overlay_layer(colors: &ColorSpec, width: u32, height: u32) -> RgbaImage {
    let mut layer = RgbaImage::new(width, height);
    for (y, row) in layer.enumerate_rows_mut() {
        let (tint, alpha) = row_tint(colors, y, height);
        let tint = Rgba([tint[0], tint[1], tint[2], alpha]);
        for (_, _, pixel) in row {
            *pixel = tint;
        }
    }
    layer
}

/// Composites the overlay layer over `canvas`.
pub fn apply_overlay(canvas: RgbImage, colors: &ColorSpec) -> RgbImage {
    let layer = overlay_layer(colors, canvas.width(), canvas.height());
    let mut base = DynamicImage::ImageRgb8(canvas).into_rgba8();
    imageops::overlay(&mut base, &layer, 0, 0);
    DynamicImage::ImageRgba8(base).into_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::color::vertical_gradient;

    fn photo() -> RgbImage {
        vertical_gradient(64, 36, Rgb([250, 200, 30]), Rgb([10, 90, 240]))
    }

    #[test]
    fn overlay_is_deterministic() {
        let colors = ColorSpec {
            overlay_start: Rgb([20, 0, 60]),
            overlay_end: Rgb([0, 80, 0]),
            overlay_opacity: 0.55,
            ..ColorSpec::default()
        };
        let first = apply_overlay(photo(), &colors);
        let second = apply_overlay(photo(), &colors);
        assert_eq!(first, second);
    }

    #[test]
    fn centre_rows_are_least_darkened() {
        let colors = ColorSpec {
            overlay_opacity: 0.3,
            ..ColorSpec::default()
        };
        let (_, top) = row_tint(&colors, 0, 720);
        let (_, middle) = row_tint(&colors, 360, 720);
        let (_, bottom) = row_tint(&colors, 719, 720);
        assert_eq!(middle, 76);
        assert!(top > middle);
        assert!(bottom > middle);
    }

    #[test]
    fn opacity_is_capped() {
        let colors = ColorSpec {
            overlay_opacity: 1.0,
            ..ColorSpec::default()
        };
        for y in [0, 100, 360, 719] {
            assert_eq!(row_tint(&colors, y, 720).1, 234);
        }
    }

    #[test]
    fn full_opacity_leaves_at_most_eight_percent_of_the_photo() {
        let colors = ColorSpec {
            overlay_opacity: 1.0,
            ..ColorSpec::default()
        };
        let white = RgbImage::from_pixel(32, 18, Rgb([255, 255, 255]));
        let covered = apply_overlay(white, &colors);
        assert!(covered.pixels().all(|pixel| pixel.0.iter().all(|c| *c <= 21)));
    }

    #[test]
    fn layer_rows_carry_the_row_tint() {
        let colors = ColorSpec {
            overlay_start: Rgb([40, 40, 40]),
            overlay_end: Rgb([40, 40, 40]),
            overlay_opacity: 0.3,
            ..ColorSpec::default()
        };
        let layer = overlay_layer(&colors, 4, 720);
        assert_eq!(*layer.get_pixel(0, 360), Rgba([40, 40, 40, 76]));
        assert_eq!(layer.get_pixel(3, 0), layer.get_pixel(0, 0));
    }

    #[test]
    fn transparent_overlay_leaves_the_photo_alone() {
        let colors = ColorSpec {
            overlay_opacity: 0.0,
            ..ColorSpec::default()
        };
        // With zero base opacity only the centre row stays fully clear.
        let photo = RgbImage::from_pixel(8, 2, Rgb([90, 140, 210]));
        let covered = apply_overlay(photo, &colors);
        assert_eq!(*covered.get_pixel(5, 1), Rgb([90, 140, 210]));
        assert_ne!(*covered.get_pixel(5, 0), Rgb([90, 140, 210]));
    }

    #[test]
    fn overlay_colour_follows_the_gradient() {
        let colors = ColorSpec {
            overlay_start: Rgb([200, 0, 0]),
            overlay_end: Rgb([0, 0, 200]),
            overlay_opacity: 1.0,
            ..ColorSpec::default()
        };
        let (top, _) = row_tint(&colors, 0, 100);
        let (middle, _) = row_tint(&colors, 50, 100);
        assert_eq!(top, Rgb([200, 0, 0]));
        assert_eq!(middle, Rgb([100, 0, 100]));
    }
}
