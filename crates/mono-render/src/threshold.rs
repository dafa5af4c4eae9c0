//! Otsu threshold selection for adaptive binarization.

use image::GrayImage;

/// Compute the Otsu threshold of a grayscale image.
///
/// Scans all 256 candidate thresholds and keeps the first one that maximizes
/// between-class variance. A degenerate image (uniform or empty) never beats
/// the initial candidate and yields 0.
pub fn otsu_level(img: &GrayImage) -> u8 {
    let mut histogram = [0u32; 256];
    for px in img.pixels() {
        histogram[px.0[0] as usize] += 1;
    }

    let total = f64::from(img.width() * img.height());
    let grand_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * f64::from(count))
        .sum();

    let mut weight_bg = 0.0f64;
    let mut sum_bg = 0.0f64;
    let mut max_between = 0.0f64;
    let mut level = 0u8;

    for t in 0..256usize {
        weight_bg += f64::from(histogram[t]);
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += t as f64 * f64::from(histogram[t]);

        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (grand_sum - sum_bg) / weight_fg;
        let between = weight_bg * weight_fg * (mean_bg - mean_fg) * (mean_bg - mean_fg);
        if between > max_between {
            max_between = between;
            level = t as u8;
        }
    }

    level
}

/// Otsu threshold plus the configured bias, saturating at 255.
pub fn biased_level(img: &GrayImage, bias: u8) -> u8 {
    otsu_level(img).saturating_add(bias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn bimodal(low: u8, high: u8) -> GrayImage {
        GrayImage::from_fn(16, 16, |x, _| {
            if x < 8 { Luma([low]) } else { Luma([high]) }
        })
    }

    #[test]
    fn bimodal_threshold_lands_between_peaks() {
        let level = otsu_level(&bimodal(10, 240));
        assert!(level > 10 && level < 240, "level = {level}");
    }

    #[test]
    fn uniform_image_yields_zero() {
        let img = GrayImage::from_pixel(8, 8, Luma([137]));
        assert_eq!(otsu_level(&img), 0);
    }

    #[test]
    fn empty_image_yields_zero() {
        let img = GrayImage::new(0, 0);
        assert_eq!(otsu_level(&img), 0);
    }

    #[test]
    fn bias_is_added() {
        let base = otsu_level(&bimodal(10, 240));
        assert_eq!(biased_level(&bimodal(10, 240), 25), base + 25);
    }

    #[test]
    fn bias_saturates_instead_of_wrapping() {
        // Peaks high enough that the Otsu level plus bias would wrap in u8.
        let level = biased_level(&bimodal(248, 254), 25);
        assert_eq!(level, 255);
    }
}
