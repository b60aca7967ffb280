//! Label font loading, measurement and drawing.
//!
//! Font scale follows the usual vision-overlay convention: `1.0` is a
//! roughly 30px tall face, so `width / 1000` keeps labels proportioned to
//! the frame.

use std::fmt;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// DejaVu Sans, shipped under `assets/` with its licence.
static EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Pixel height of the face at font scale 1.0.
pub const BASE_FONT_PX: f32 = 30.0;

#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
}

impl LabelFont {
    /// The font compiled into the crate.
    pub fn embedded() -> Result<Self> {
        let font = FontArc::try_from_slice(EMBEDDED_FONT)
            .map_err(|e| anyhow!("embedded label font is invalid: {}", e))?;
        Ok(Self { font })
    }

    /// Load a TrueType/OpenType font from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| anyhow!("invalid font file {}: {}", path.display(), e))?;
        Ok(Self { font })
    }

    pub fn px_scale(font_scale: f32) -> PxScale {
        PxScale::from((BASE_FONT_PX * font_scale).max(1.0))
    }

    /// Rendered `(width, height)` of `text` in pixels.
    pub fn measure(&self, text: &str, font_scale: f32) -> (u32, u32) {
        text_size(Self::px_scale(font_scale), &self.font, text)
    }

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    ///
    /// `stroke` above 1 thickens the glyphs by repeating them at successive
    /// one-pixel horizontal offsets. Glyphs are clipped to the image.
    pub fn draw(
        &self,
        image: &mut RgbImage,
        color: Rgb<u8>,
        x: i32,
        baseline: i32,
        font_scale: f32,
        stroke: u32,
        text: &str,
    ) {
        let scale = Self::px_scale(font_scale);
        let ascent = self.font.as_scaled(scale).ascent().round() as i32;
        let top = baseline - ascent;
        for offset in 0..stroke.max(1) as i32 {
            draw_text_mut(image, color, x + offset, top, scale, &self.font, text);
        }
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}
