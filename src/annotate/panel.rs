use crate::detect::ClassCounts;
use crate::frame::Frame;
use crate::font::LabelFont;
use crate::palette::{Color, WITHOUT_MASK, WITH_MASK};

use super::draw::fill_rect;

pub const PANEL_HEIGHT: u32 = 50;
pub const PANEL_COLOR: Color = Color::new(20, 20, 20);
const PANEL_FONT_SCALE: f32 = 0.7;
const PANEL_TEXT_STROKE: u32 = 2;
const PANEL_MARGIN_X: i32 = 10;
const PANEL_BASELINE_Y: i32 = 35;

/// Top-bar summary: frame rate plus compliant and violation counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoPanel {
    pub safe_label: String,
    pub risk_label: String,
}

impl InfoPanel {
    pub fn new(safe_label: impl Into<String>, risk_label: impl Into<String>) -> Self {
        Self {
            safe_label: safe_label.into(),
            risk_label: risk_label.into(),
        }
    }

    pub fn text(&self, fps: f64, counts: &ClassCounts) -> String {
        format!(
            "FPS: {:.1} | Safe: {} | Risk: {}",
            fps,
            counts.get(&self.safe_label),
            counts.get(&self.risk_label)
        )
    }

    /// Draws the opaque bar across the full width (clipped on frames shorter
    /// than the bar) and the summary line on top of it.
    pub(crate) fn draw(&self, frame: &mut Frame, font: &LabelFont, fps: f64, counts: &ClassCounts) {
        let bar = frame.encode(PANEL_COLOR);
        let white = frame.encode(Color::WHITE);
        let width = frame.width();
        let text = self.text(fps, counts);
        let image = frame.image_mut();
        fill_rect(image, 0, 0, width, PANEL_HEIGHT, bar);
        font.draw(
            image,
            white,
            PANEL_MARGIN_X,
            PANEL_BASELINE_Y,
            PANEL_FONT_SCALE,
            PANEL_TEXT_STROKE,
            &text,
        );
    }
}

impl Default for InfoPanel {
    fn default() -> Self {
        Self::new(WITH_MASK, WITHOUT_MASK)
    }
}
