/// Weight of the overlay in the fill blend, in percent.
pub const FILL_ALPHA_PERCENT: u32 = 15;

/// Stroke and font sizing derived from the frame width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    /// Border thickness in pixels: `max(2, width / 500)`.
    pub thickness: u32,
    /// Label font scale: `width / 1000`.
    pub font_scale: f32,
}

impl RenderStyle {
    pub fn for_width(width: u32) -> Self {
        Self {
            thickness: (width / 500).max(2),
            font_scale: width as f32 / 1000.0,
        }
    }

    /// Stroke for label text: half the border, at least one pixel.
    pub fn label_stroke(&self) -> u32 {
        (self.thickness / 2).max(1)
    }
}
