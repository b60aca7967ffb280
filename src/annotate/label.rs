use crate::detect::{BoundingBox, Detection};

/// Gap between the text baseline and the bottom edge of its tag.
pub const BASELINE_GAP: i32 = 5;

/// `"{class_label} {confidence as percent, 2 decimals}"`.
pub fn label_text(detection: &Detection) -> String {
    format!(
        "{} {:.2}%",
        detection.class_label,
        detection.confidence * 100.0
    )
}

/// Where a label tag lands for one box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagPlacement {
    pub x: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub baseline: i32,
    /// True when the tag hangs below the box top edge instead of sitting
    /// above it.
    pub flipped: bool,
}

/// Place a tag for text measuring `text_w` x `text_h` on `bbox`.
///
/// The tag is `1.5 * text_h` tall and `text_w` wide, left-aligned with the
/// box, and normally sits directly above the box top edge. When that would
/// cross the top of the frame it hangs below the top edge instead. Any
/// horizontal overflow is left to clipping.
pub fn place_tag(bbox: &BoundingBox, text_w: u32, text_h: u32) -> TagPlacement {
    let height = (text_h as f32 * 1.5) as u32;
    let height = height.max(1);
    let above = bbox.y1 - height as i32;
    let (top, flipped) = if above < 0 {
        (bbox.y1, true)
    } else {
        (above, false)
    };
    TagPlacement {
        x: bbox.x1,
        top,
        width: text_w.max(1),
        height,
        baseline: top + height as i32 - BASELINE_GAP,
        flipped,
    }
}
