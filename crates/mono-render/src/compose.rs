//! Source-image compositing onto the fixed display canvas.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::{CANVAS_HEIGHT, CANVAS_WIDTH, ICON_SIZE};

/// Resample a source image to the icon size using Lanczos3 filtering.
pub fn resize_icon(src: &DynamicImage) -> DynamicImage {
    debug!(
        orig_w = src.width(),
        orig_h = src.height(),
        target = ICON_SIZE,
        "resizing source to icon size"
    );
    src.resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Lanczos3)
}

/// Center an image on a blank (transparent black) 128x64 canvas.
///
/// Offsets floor-divide, so an image larger than the canvas gets a negative
/// offset; pixels landing outside the canvas are dropped rather than
/// wrapped.
pub fn center_on_canvas(src: &DynamicImage) -> RgbaImage {
    let rgba = src.to_rgba8();
    let mut canvas = RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);

    let start_x = (CANVAS_WIDTH as i64 - i64::from(rgba.width())) / 2;
    let start_y = (CANVAS_HEIGHT as i64 - i64::from(rgba.height())) / 2;
    debug!(start_x, start_y, "drawing source onto canvas center");

    for (x, y, px) in rgba.enumerate_pixels() {
        let tx = start_x + i64::from(x);
        let ty = start_y + i64::from(y);
        if (0..i64::from(CANVAS_WIDTH)).contains(&tx) && (0..i64::from(CANVAS_HEIGHT)).contains(&ty)
        {
            canvas.put_pixel(tx as u32, ty as u32, *px);
        }
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 200, 200, 255]),
        ))
    }

    #[test]
    fn icon_lands_at_expected_offset() {
        let canvas = center_on_canvas(&solid(60, 60));

        // (128-60)/2 = 34, (64-60)/2 = 2
        assert_eq!(canvas.get_pixel(34, 2).0, [200, 200, 200, 255]);
        assert_eq!(canvas.get_pixel(93, 61).0, [200, 200, 200, 255]);
        assert_eq!(canvas.get_pixel(33, 2).0, [0, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(94, 61).0, [0, 0, 0, 0]);
    }

    #[test]
    fn canvas_is_always_display_sized() {
        let canvas = center_on_canvas(&solid(10, 10));
        assert_eq!(canvas.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[test]
    fn oversized_source_is_clipped_not_wrapped() {
        let canvas = center_on_canvas(&solid(200, 80));
        assert_eq!(canvas.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        // Fully covered canvas, nothing panicked.
        assert!(canvas.pixels().all(|px| px.0 == [200, 200, 200, 255]));
    }

    #[test]
    fn resize_icon_hits_icon_size() {
        let resized = resize_icon(&solid(200, 100));
        assert_eq!(resized.width(), ICON_SIZE);
        assert_eq!(resized.height(), ICON_SIZE);
    }
}
