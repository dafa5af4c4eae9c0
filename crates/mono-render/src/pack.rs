//! 1-bit packing codec for binarized images.
//!
//! Pixels are packed row-major, most-significant-bit first, contiguously
//! across the whole image: a new byte starts every 8 pixels regardless of
//! row boundaries.

use image::RgbaImage;

use crate::luma8;

/// Luminance above which a packed pixel counts as white. Fixed, independent
/// of the dithering threshold.
const WHITE_BOUNDARY: u8 = 127;

/// Serialize a black/white image into a 1-bit-per-pixel byte stream.
///
/// The final byte is emitted as-is with unset trailing bits when the pixel
/// count is not a multiple of 8. Output length is `ceil(width*height/8)`.
pub fn pack_1bit(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity((img.width() * img.height()).div_ceil(8) as usize);
    let mut current: u8 = 0;
    let mut bit: u8 = 7;

    for px in img.pixels() {
        if luma8(px) > WHITE_BOUNDARY {
            current |= 1 << bit;
        }

        if bit == 0 {
            out.push(current);
            current = 0;
            bit = 7;
        } else {
            bit -= 1;
        }
    }

    if bit != 7 {
        out.push(current);
    }

    out
}

/// Expand a packed stream back into row-major pixel flags (true = white).
///
/// Used by tests and diagnostics; the inverse of [`pack_1bit`].
pub fn unpack_1bit(data: &[u8], width: u32, height: u32) -> Vec<bool> {
    let count = (width * height) as usize;
    (0..count)
        .map(|i| {
            data.get(i / 8)
                .is_some_and(|byte| byte & (1 << (7 - (i % 8))) != 0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn checkerboard_round_trips() {
        let img = checkerboard(8, 8);
        let packed = pack_1bit(&img);
        let unpacked = unpack_1bit(&packed, 8, 8);

        for (i, &white) in unpacked.iter().enumerate() {
            let (x, y) = (i as u32 % 8, i as u32 / 8);
            assert_eq!(white, (x + y) % 2 == 0, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn packed_length_is_ceil_of_pixels_over_eight() {
        assert_eq!(pack_1bit(&checkerboard(8, 8)).len(), 8);
        assert_eq!(pack_1bit(&checkerboard(3, 3)).len(), 2);
        assert_eq!(pack_1bit(&checkerboard(128, 64)).len(), 1024);
    }

    #[test]
    fn bits_run_contiguously_across_rows() {
        // 3x3 all white: 9 pixels -> 0xFF plus one byte holding a single
        // high bit. Rows are not padded to byte boundaries.
        let img = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        assert_eq!(pack_1bit(&img), vec![0xFF, 0x80]);
    }

    #[test]
    fn msb_is_first_pixel() {
        let mut img = RgbaImage::from_pixel(8, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        assert_eq!(pack_1bit(&img), vec![0x80]);
    }

    #[test]
    fn boundary_luminance_is_black() {
        // Exactly 127 is not white.
        let img = RgbaImage::from_pixel(8, 1, Rgba([127, 127, 127, 255]));
        assert_eq!(pack_1bit(&img), vec![0x00]);
    }
}
