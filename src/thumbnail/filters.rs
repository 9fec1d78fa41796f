//! Contrast, sharpness and sharpen passes.
//!
//! Enhancement works by extrapolating away from a "degenerate" version of the
//! image: `out = degenerate + (image - degenerate) * factor`. A factor of 1.0
//! returns the image unchanged.

use image::{Pixel, RgbImage};

/// Kernel of the final sharpen pass.
pub const SHARPEN_KERNEL: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];
const SHARPEN_DIVISOR: i32 = 16;

const SMOOTH_KERNEL: [i32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];
const SMOOTH_DIVISOR: i32 = 13;

/// 3x3 convolution. Border pixels are copied through unchanged.
pub fn convolve3x3(image: &RgbImage, kernel: &[i32; 9], divisor: i32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 || divisor == 0 {
        return out;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0i32; 3];
            for (i, weight) in kernel.iter().enumerate() {
                let sx = x - 1 + (i % 3) as u32;
                let sy = y - 1 + (i / 3) as u32;
                let source = image.get_pixel(sx, sy);
                for (channel, value) in acc.iter_mut().zip(source.channels()) {
                    *channel += weight * i32::from(*value);
                }
            }
            let pixel = out.get_pixel_mut(x, y);
            for (channel, value) in pixel.channels_mut().iter_mut().zip(acc) {
                *channel = (value as f32 / divisor as f32).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// The unconditional sharpen applied before encoding.
pub fn sharpen(image: &RgbImage) -> RgbImage {
    convolve3x3(image, &SHARPEN_KERNEL, SHARPEN_DIVISOR)
}

/// Contrast enhancement around the mean luminance.
pub fn enhance_contrast(image: RgbImage, factor: f32) -> RgbImage {
    let mean = mean_luma(&image);
    let mut image = image;
    for pixel in image.pixels_mut() {
        for channel in pixel.channels_mut() {
            *channel = extrapolate(mean, f32::from(*channel), factor);
        }
    }
    image
}

/// Sharpness enhancement against a smoothed copy.
pub fn enhance_sharpness(image: RgbImage, factor: f32) -> RgbImage {
    let smoothed = convolve3x3(&image, &SMOOTH_KERNEL, SMOOTH_DIVISOR);
    let mut image = image;
    for (pixel, degenerate) in image.pixels_mut().zip(smoothed.pixels()) {
        for (channel, base) in pixel.channels_mut().iter_mut().zip(degenerate.channels()) {
            *channel = extrapolate(f32::from(*base), f32::from(*channel), factor);
        }
    }
    image
}

fn extrapolate(degenerate: f32, value: f32, factor: f32) -> u8 {
    (degenerate + (value - degenerate) * factor)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn mean_luma(image: &RgbImage) -> f32 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0.0;
    }
    let total: u64 = image
        .pixels()
        .map(|pixel| {
            let [r, g, b] = pixel.0;
            (299 * u64::from(r) + 587 * u64::from(g) + 114 * u64::from(b)) / 1000
        })
        .sum();
    (total as f32 / count as f32).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn flat_images_survive_every_pass() {
        let flat = RgbImage::from_pixel(16, 9, Rgb([90, 120, 30]));
        assert_eq!(sharpen(&flat), flat);
        assert_eq!(enhance_sharpness(flat.clone(), 1.2), flat);
    }

    #[test]
    fn contrast_pushes_away_from_the_mean() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        image.put_pixel(1, 0, Rgb([200, 200, 200]));
        let enhanced = enhance_contrast(image, 1.3);
        assert_eq!(*enhanced.get_pixel(0, 0), Rgb([85, 85, 85]));
        assert_eq!(*enhanced.get_pixel(1, 0), Rgb([215, 215, 215]));
    }

    #[test]
    fn sharpen_boosts_an_isolated_dot() {
        let mut image = RgbImage::from_pixel(5, 5, Rgb([100, 100, 100]));
        image.put_pixel(2, 2, Rgb([140, 140, 140]));
        let sharpened = sharpen(&image);
        assert_eq!(*sharpened.get_pixel(2, 2), Rgb([180, 180, 180]));
        assert_eq!(*sharpened.get_pixel(1, 1), Rgb([95, 95, 95]));
        assert_eq!(*sharpened.get_pixel(0, 0), Rgb([100, 100, 100]));
    }

    #[test]
    fn tiny_images_are_left_alone() {
        let image = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert_eq!(sharpen(&image), image);
    }
}
