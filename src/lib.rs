//! Mask Witness
//!
//! Overlay kernel for face-mask compliance dashboards. A host loop pulls
//! frames from a source, runs a detector, filters by confidence and hands the
//! resulting detection list to two independent consumers:
//!
//! 1. **`FrameAnnotator`** draws class-coloured semi-transparent boxes,
//!    borders and label tags scaled to the frame, plus an optional info bar.
//! 2. **`ViolationLog`** appends a row for every detection carrying the
//!    configured violation label.
//!
//! The annotator never logs and the log never draws.
//!
//! # Module Structure
//!
//! - `frame`: pixel buffers and channel order
//! - `palette`: class label to colour table
//! - `annotate`: the overlay renderer and info panel
//! - `detect`: detection types, detector backend seam, confidence filter
//! - `ingest`: image-file and synthetic frame sources
//! - `violation`: in-memory violation table
//! - `config`: dashboard settings (file + environment)

pub mod annotate;
pub mod config;
pub mod detect;
pub mod font;
pub mod frame;
pub mod ingest;
pub mod palette;
pub mod ui;
pub mod violation;

pub use annotate::{FrameAnnotator, InfoPanel, OverlayScratch, RenderStyle};
pub use config::DashboardConfig;
pub use detect::{
    BoundingBox, ClassCounts, Detection, DetectionFilter, DetectorBackend, StubBackend,
};
pub use font::LabelFont;
pub use frame::{ChannelOrder, Frame};
pub use ingest::{FileConfig, FileSource, SyntheticConfig, SyntheticSource};
pub use palette::{Color, ColorPalette};
pub use violation::{ViolationLog, ViolationRecord, ViolationRule};

use serde::Deserialize;

/// Detections for one image, as stored in a JSON sidecar next to it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DetectionSidecar {
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl DetectionSidecar {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
