use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates. Both corners are inclusive.
///
/// Serialises as `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box with both corners inside a `width` x `height` frame.
    ///
    /// Swapped corners are reordered; boxes partly or fully off-frame are
    /// pulled onto the nearest edge, so the result may be a single pixel
    /// wide but is never empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> BoundingBox {
        let max_x = width.saturating_sub(1) as i32;
        let max_y = height.saturating_sub(1) as i32;
        let (lo_x, hi_x) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (lo_y, hi_y) = (self.y1.min(self.y2), self.y1.max(self.y2));
        BoundingBox {
            x1: lo_x.clamp(0, max_x),
            y1: lo_y.clamp(0, max_y),
            x2: hi_x.clamp(0, max_x),
            y2: hi_y.clamp(0, max_y),
        }
    }

    /// Inclusive pixel width (`x2 - x1 + 1`), zero for swapped corners.
    pub fn width(&self) -> u32 {
        (self.x2 - self.x1 + 1).max(0) as u32
    }

    /// Inclusive pixel height (`y2 - y1 + 1`), zero for swapped corners.
    pub fn height(&self) -> u32 {
        (self.y2 - self.y1 + 1).max(0) as u32
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One object found by the upstream detector in a single frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: String,
    /// Detector score in `0..=1`.
    pub confidence: f32,
    pub bounding_box: BoundingBox,
    /// Tracker identity, stable across frames when a tracker is upstream.
    /// Rendering ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,
}

impl Detection {
    pub fn new(class_label: impl Into<String>, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            class_label: class_label.into(),
            confidence,
            bounding_box,
            track_id: None,
        }
    }

    pub fn with_track_id(mut self, track_id: u64) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

/// Drops detections below a confidence threshold before they reach the
/// annotator or the violation log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionFilter {
    pub min_confidence: f32,
}

impl DetectionFilter {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    pub fn passes(&self, detection: &Detection) -> bool {
        detection.confidence >= self.min_confidence
    }

    pub fn apply(&self, mut detections: Vec<Detection>) -> Vec<Detection> {
        detections.retain(|d| self.passes(d));
        detections
    }
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Per-frame occurrence counts by class label. Absent labels read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassCounts {
    counts: BTreeMap<String, usize>,
}

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(detections: &[Detection]) -> Self {
        let mut counts = Self::new();
        for detection in detections {
            counts.add(&detection.class_label, 1);
        }
        counts
    }

    pub fn add(&mut self, label: &str, n: usize) {
        *self.counts.entry(label.to_string()).or_insert(0) += n;
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, n)| (label.as_str(), *n))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ClassCounts {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            counts: iter
                .into_iter()
                .map(|(label, n)| (label.into(), n))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_pulls_boxes_inside_the_frame() {
        let b = BoundingBox::new(-5, -5, 120, 40).clamp_to(100, 50);
        assert_eq!(b, BoundingBox::new(0, 0, 99, 40));

        let swapped = BoundingBox::new(30, 20, 10, 5).clamp_to(100, 50);
        assert_eq!(swapped, BoundingBox::new(10, 5, 30, 20));

        let off_frame = BoundingBox::new(500, 500, 600, 600).clamp_to(100, 50);
        assert_eq!(off_frame, BoundingBox::new(99, 49, 99, 49));
        assert_eq!(off_frame.width(), 1);
        assert_eq!(off_frame.height(), 1);
    }

    #[test]
    fn detection_parses_from_sidecar_json() {
        let json = r#"{"class_label":"without_mask","confidence":0.87,"bounding_box":[100,100,300,300]}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.class_label, "without_mask");
        assert_eq!(detection.bounding_box, BoundingBox::new(100, 100, 300, 300));
        assert_eq!(detection.track_id, None);
    }

    #[test]
    fn filter_keeps_threshold_and_above() {
        let b = BoundingBox::new(0, 0, 1, 1);
        let detections = vec![
            Detection::new("a", 0.49, b),
            Detection::new("b", 0.5, b),
            Detection::new("c", 0.9, b),
        ];
        let kept = DetectionFilter::new(0.5).apply(detections);
        let labels: Vec<_> = kept.iter().map(|d| d.class_label.as_str()).collect();
        assert_eq!(labels, ["b", "c"]);
    }

    #[test]
    fn tally_counts_labels_and_defaults_to_zero() {
        let b = BoundingBox::new(0, 0, 1, 1);
        let counts = ClassCounts::tally(&[
            Detection::new("with_mask", 0.9, b),
            Detection::new("without_mask", 0.8, b),
            Detection::new("with_mask", 0.7, b),
        ]);
        assert_eq!(counts.get("with_mask"), 2);
        assert_eq!(counts.get("without_mask"), 1);
        assert_eq!(counts.get("mask_weared_incorrect"), 0);
        assert_eq!(counts.total(), 3);
    }
}
