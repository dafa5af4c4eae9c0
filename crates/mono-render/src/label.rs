//! Optional display-index label drawn in the canvas corner.

use std::path::PathBuf;
use std::sync::LazyLock;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::warn;

use crate::{RenderError, Result};

/// Label font size in pixels.
pub const LABEL_SCALE: f32 = 16.0;

/// Env var overriding the label font path.
const FONT_ENV: &str = "MIXDECK_FONT";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
];

static LABEL_FONT: LazyLock<Option<FontVec>> = LazyLock::new(|| match load_label_font() {
    Ok(font) => Some(font),
    Err(err) => {
        warn!(%err, "index labels disabled");
        None
    }
});

/// The shared label font, loaded once on first use. `None` when no font is
/// available on this system.
pub fn label_font() -> Option<&'static FontVec> {
    LABEL_FONT.as_ref()
}

/// Load the label font from `MIXDECK_FONT` or a set of well-known paths.
pub fn load_label_font() -> Result<FontVec> {
    let path = font_path().ok_or(RenderError::FontNotFound)?;
    let data = std::fs::read(&path).map_err(|source| RenderError::FontRead {
        path: path.display().to_string(),
        source,
    })?;
    FontVec::try_from_vec(data).map_err(|_| RenderError::FontParse)
}

fn font_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(FONT_ENV) {
        return Some(PathBuf::from(path));
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Draw `index` in the top-right corner of the canvas.
pub fn draw_index_label(canvas: &mut RgbaImage, font: &FontVec, index: u8) {
    let text = index.to_string();
    let scale = PxScale::from(LABEL_SCALE);
    let width = text_width(font, scale, &text) as i32;
    let x = (canvas.width() as i32 - width - 2).max(0);
    draw_text_mut(canvas, Rgba([255, 255, 255, 255]), x, 2, scale, font, &text);
}

/// Measure the pixel width of a string at the given scale.
fn text_width(font: &impl Font, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, glyph);
        }
        width += scaled.h_advance(glyph);
        prev = Some(glyph);
    }

    width.ceil() as u32
}
