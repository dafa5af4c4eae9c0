//! Floyd-Steinberg error-diffusion dithering.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::luma8;

/// Convert an RGBA canvas into a pure black/white RGBA image.
///
/// Error distribution pattern:
/// - Right:        7/16
/// - Bottom-left:  3/16
/// - Bottom:       5/16
/// - Bottom-right: 1/16
///
/// The quantization error is diffused into the working grid the scan is
/// reading from, so later pixels see the already-adjusted values. Neighbors
/// outside the image are skipped.
pub fn floyd_steinberg_dither(canvas: &RgbaImage, threshold: u8) -> RgbaImage {
    let (width, height) = canvas.dimensions();
    debug!(width, height, threshold, "applying Floyd-Steinberg dithering");

    // i16 working grid: diffused error can push values outside 0..=255.
    let mut grid: Vec<i16> = canvas.pixels().map(|px| i16::from(luma8(px))).collect();

    let mut output = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let old = grid[(y * width + x) as usize];
            let new: i16 = if old > i16::from(threshold) { 255 } else { 0 };
            let value = new as u8;
            output.put_pixel(x, y, Rgba([value, value, value, 255]));

            distribute_error(&mut grid, x, y, width, height, old - new);
        }
    }

    output
}

/// Diffuse quantization error into the still-pending neighbor pixels.
fn distribute_error(grid: &mut [i16], x: u32, y: u32, width: u32, height: u32, error: i16) {
    let idx = (y * width + x) as usize;
    let w = width as usize;

    // Right: 7/16
    if x + 1 < width {
        grid[idx + 1] += error * 7 / 16;
    }
    if y + 1 < height {
        // Bottom-left: 3/16
        if x > 0 {
            grid[idx + w - 1] += error * 3 / 16;
        }
        // Bottom: 5/16
        grid[idx + w] += error * 5 / 16;
        // Bottom-right: 1/16
        if x + 1 < width {
            grid[idx + w + 1] += error / 16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_canvas(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = ((x + y) * 255 / (width + height - 2)) as u8;
            Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn output_is_binary() {
        let result = floyd_steinberg_dither(&gradient_canvas(8, 8), 127);
        for px in result.pixels() {
            assert!(
                px.0 == [0, 0, 0, 255] || px.0 == [255, 255, 255, 255],
                "pixel {:?} is neither black nor white",
                px.0
            );
        }
    }

    #[test]
    fn dithering_is_deterministic() {
        let canvas = gradient_canvas(16, 9);
        let first = floyd_steinberg_dither(&canvas, 140);
        let second = floyd_steinberg_dither(&canvas, 140);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn all_white_input_stays_white() {
        let canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let result = floyd_steinberg_dither(&canvas, 127);
        assert!(result.pixels().all(|px| px.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn all_black_input_stays_black() {
        let canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let result = floyd_steinberg_dither(&canvas, 127);
        assert!(result.pixels().all(|px| px.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn midtone_area_mixes_both_colors() {
        let canvas = RgbaImage::from_pixel(16, 16, Rgba([127, 127, 127, 255]));
        let result = floyd_steinberg_dither(&canvas, 127);
        let whites = result.pixels().filter(|px| px.0[0] == 255).count();
        assert!(whites > 0 && whites < 256, "whites = {whites}");
    }

    #[test]
    fn preserves_dimensions() {
        let result = floyd_steinberg_dither(&gradient_canvas(10, 5), 127);
        assert_eq!(result.dimensions(), (10, 5));
    }
}
