//! The full image-to-bitmap pipeline.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::options::RenderOptions;
use crate::{compose, dither, label, luma8, pack, threshold};

/// Render a source image into the packed 1-bit display bitmap.
///
/// Stages: optional Lanczos3 resize, centering on the blank canvas, optional
/// index label, Otsu threshold (plus bias), Floyd-Steinberg dithering, 1-bit
/// packing.
pub fn to_display_bitmap(src: &DynamicImage, opts: &RenderOptions) -> Vec<u8> {
    let staged = if opts.resize {
        compose::resize_icon(src)
    } else {
        src.clone()
    };
    let mut canvas = compose::center_on_canvas(&staged);

    if let Some(index) = opts.label {
        if let Some(font) = label::label_font() {
            label::draw_index_label(&mut canvas, font, index);
        }
    }

    let gray = GrayImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        Luma([luma8(canvas.get_pixel(x, y))])
    });
    let level = threshold::biased_level(&gray, opts.threshold_bias);
    debug!(level, "binarization threshold selected");

    let bw = dither::floyd_steinberg_dither(&canvas, level);
    pack::pack_1bit(&bw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use crate::{CANVAS_HEIGHT, CANVAS_WIDTH};

    fn sample_icon() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(48, 48, |x, y| {
            let v = ((x * 5 + y * 3) % 256) as u8;
            Rgba([v, v, v, 255])
        }))
    }

    #[test]
    fn bitmap_is_always_canvas_sized() {
        let bitmap = to_display_bitmap(&sample_icon(), &RenderOptions::default());
        assert_eq!(bitmap.len(), (CANVAS_WIDTH * CANVAS_HEIGHT / 8) as usize);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let icon = sample_icon();
        let opts = RenderOptions::default();
        assert_eq!(to_display_bitmap(&icon, &opts), to_display_bitmap(&icon, &opts));
    }

    #[test]
    fn unresized_source_keeps_native_pixels() {
        // A display-sized source must cover the full canvas without the
        // icon-size resample shrinking it.
        let full = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            Rgba([255, 255, 255, 255]),
        ));
        let opts = RenderOptions::new().with_resize(false).with_threshold_bias(0);
        let bitmap = to_display_bitmap(&full, &opts);
        assert!(bitmap.iter().all(|&b| b == 0xFF));
    }
}
