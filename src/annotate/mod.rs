//! Detection overlay renderer.
//!
//! `FrameAnnotator` draws, for every detection, a class-coloured
//! semi-transparent fill, an opaque border and an opaque label tag; the
//! optional info panel summarises a frame in a dark top bar.
//!
//! Fills are accumulated on an overlay buffer that starts as a copy of the
//! frame and are blended once per call at 15% overlay weight. Borders and
//! tags are drawn after the blend, in input order, so they stay at full
//! opacity and later detections paint over earlier ones.

mod draw;
mod label;
mod panel;
mod style;

use anyhow::Result;
use image::RgbImage;

use crate::config::DashboardConfig;
use crate::detect::{BoundingBox, ClassCounts, Detection};
use crate::font::LabelFont;
use crate::frame::Frame;
use crate::palette::{Color, ColorPalette};

pub use label::{label_text, place_tag, TagPlacement, BASELINE_GAP};
pub use panel::{InfoPanel, PANEL_COLOR, PANEL_HEIGHT};
pub use style::{RenderStyle, FILL_ALPHA_PERCENT};

/// Caller-owned overlay buffer for `FrameAnnotator::annotate_in_place`.
///
/// Reusing one per thread avoids an allocation per frame. It is resized to
/// whatever frame it is used with.
#[derive(Clone, Debug, Default)]
pub struct OverlayScratch {
    image: RgbImage,
}

impl OverlayScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_from(&mut self, source: &RgbImage) {
        if self.image.dimensions() == source.dimensions() {
            self.image.copy_from_slice(source);
        } else {
            self.image = source.clone();
        }
    }
}

/// Stateless per-frame annotator. Holds only the read-only palette, label
/// font and info-panel labels, so one instance can serve many threads.
#[derive(Clone, Debug)]
pub struct FrameAnnotator {
    palette: ColorPalette,
    font: LabelFont,
    panel: InfoPanel,
}

impl FrameAnnotator {
    /// Annotator using the embedded label font.
    pub fn new(palette: ColorPalette) -> Result<Self> {
        Ok(Self::with_font(palette, LabelFont::embedded()?))
    }

    pub fn with_font(palette: ColorPalette, font: LabelFont) -> Self {
        Self {
            palette,
            font,
            panel: InfoPanel::default(),
        }
    }

    /// Palette, font and panel labels as configured for the dashboard.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let font = match &config.font_path {
            Some(path) => LabelFont::from_path(path)?,
            None => LabelFont::embedded()?,
        };
        Ok(Self::with_font(config.palette(), font).with_info_panel(config.info_panel()))
    }

    pub fn with_info_panel(mut self, panel: InfoPanel) -> Self {
        self.panel = panel;
        self
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn info_panel(&self) -> &InfoPanel {
        &self.panel
    }

    /// Annotated copy of `frame`. The input is only read.
    pub fn annotate(&self, frame: &Frame, detections: &[Detection]) -> Frame {
        let mut output = frame.clone();
        let mut scratch = OverlayScratch::new();
        self.annotate_in_place(&mut output, detections, &mut scratch);
        output
    }

    /// Annotate `frame` directly, using `scratch` for the fill overlay.
    pub fn annotate_in_place(
        &self,
        frame: &mut Frame,
        detections: &[Detection],
        scratch: &mut OverlayScratch,
    ) {
        let style = RenderStyle::for_width(frame.width());
        let (width, height) = (frame.width(), frame.height());
        let shapes: Vec<(BoundingBox, Color)> = detections
            .iter()
            .map(|d| {
                (
                    d.bounding_box.clamp_to(width, height),
                    self.palette.color_for(&d.class_label),
                )
            })
            .collect();

        scratch.reset_from(frame.image());
        for (bbox, color) in &shapes {
            draw::fill_box(&mut scratch.image, bbox, frame.encode(*color));
        }
        draw::blend_overlay(frame.image_mut(), &scratch.image, FILL_ALPHA_PERCENT);

        for (detection, (bbox, color)) in detections.iter().zip(&shapes) {
            let pixel = frame.encode(*color);
            draw::stroke_box(frame.image_mut(), bbox, style.thickness, pixel);
            self.draw_tag(frame, detection, bbox, *color, &style);
        }

        log::trace!(
            "annotated {}x{} frame with {} detections",
            width,
            height,
            detections.len()
        );
    }

    fn draw_tag(
        &self,
        frame: &mut Frame,
        detection: &Detection,
        bbox: &BoundingBox,
        color: Color,
        style: &RenderStyle,
    ) {
        let text = label_text(detection);
        let (text_w, text_h) = self.font.measure(&text, style.font_scale);
        let tag = place_tag(bbox, text_w, text_h);
        let background = frame.encode(color);
        let white = frame.encode(Color::WHITE);
        let image = frame.image_mut();
        draw::fill_rect(image, tag.x, tag.top, tag.width, tag.height, background);
        self.font.draw(
            image,
            white,
            tag.x,
            tag.baseline,
            style.font_scale,
            style.label_stroke(),
            &text,
        );
    }

    /// Copy of `frame` with the summary bar drawn over its top 50 rows.
    pub fn add_info_panel(&self, frame: &Frame, fps: f64, counts: &ClassCounts) -> Frame {
        let mut output = frame.clone();
        self.draw_info_panel(&mut output, fps, counts);
        output
    }

    pub fn draw_info_panel(&self, frame: &mut Frame, fps: f64, counts: &ClassCounts) {
        self.panel.draw(frame, &self.font, fps, counts);
    }

    /// The summary line `add_info_panel` renders.
    pub fn info_text(&self, fps: f64, counts: &ClassCounts) -> String {
        self.panel.text(fps, counts)
    }
}
