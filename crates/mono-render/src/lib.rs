//! Monochrome rendering pipeline for the mixer deck displays.
//!
//! Converts arbitrary source images into the fixed 128x64 1-bit bitmaps the
//! display firmware expects: resize, canvas compositing, Otsu-thresholded
//! Floyd-Steinberg dithering, and 1-bit packing.

pub mod compose;
pub mod dither;
pub mod label;
pub mod options;
pub mod pack;
pub mod pipeline;
pub mod threshold;

// Re-exports for convenience
pub use dither::floyd_steinberg_dither;
pub use options::RenderOptions;
pub use pack::{pack_1bit, unpack_1bit};
pub use pipeline::to_display_bitmap;
pub use threshold::{biased_level, otsu_level};

/// Display canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 128;

/// Display canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 64;

/// Edge length of a composited application icon.
pub const ICON_SIZE: u32 = 60;

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no usable label font found (set MIXDECK_FONT to a .ttf path)")]
    FontNotFound,

    #[error("failed to read label font {path}: {source}")]
    FontRead {
        path: String,
        source: std::io::Error,
    },

    #[error("label font data is not a valid font")]
    FontParse,
}

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Integer Rec. 601 luma of an RGBA pixel, matching the rounding used by
/// the display firmware's reference tooling.
pub(crate) fn luma8(px: &image::Rgba<u8>) -> u8 {
    let [r, g, b, _] = px.0;
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000) as u8
}
