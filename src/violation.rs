//! In-memory violation log.
//!
//! The log and the annotator consume the same detection list independently:
//! nothing here draws, and the annotator never records.

use std::collections::BTreeMap;

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::detect::Detection;
use crate::palette::WITHOUT_MASK;

pub const CSV_HEADER: &str = "Timestamp,Event,Confidence";

/// Which detector label counts as a violation, and the event name recorded
/// for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRule {
    pub label: String,
    pub event: String,
}

impl ViolationRule {
    pub fn new(label: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            event: event.into(),
        }
    }

    pub fn matches(&self, detection: &Detection) -> bool {
        detection.class_label == self.label
    }
}

impl Default for ViolationRule {
    fn default() -> Self {
        Self::new(WITHOUT_MASK, "No Mask")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Local wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    pub event: String,
    pub confidence: f32,
}

#[derive(Clone, Debug, Default)]
pub struct ViolationLog {
    rule: ViolationRule,
    rows: Vec<ViolationRecord>,
}

impl ViolationLog {
    pub fn new(rule: ViolationRule) -> Self {
        Self {
            rule,
            rows: Vec::new(),
        }
    }

    pub fn rule(&self) -> &ViolationRule {
        &self.rule
    }

    /// Append one row per detection matching the rule. Returns the number of
    /// rows appended.
    pub fn record(&mut self, detections: &[Detection], at: NaiveTime) -> usize {
        let timestamp = at.format("%H:%M:%S").to_string();
        let before = self.rows.len();
        for detection in detections.iter().filter(|d| self.rule.matches(d)) {
            self.rows.push(ViolationRecord {
                timestamp: timestamp.clone(),
                event: self.rule.event.clone(),
                confidence: detection.confidence,
            });
        }
        let appended = self.rows.len() - before;
        if appended > 0 {
            log::debug!("{} '{}' events logged at {}", appended, self.rule.event, timestamp);
        }
        appended
    }

    pub fn record_now(&mut self, detections: &[Detection]) -> usize {
        self.record(detections, Local::now().time())
    }

    pub fn rows(&self) -> &[ViolationRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The most recent `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> &[ViolationRecord] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Row count per event name.
    pub fn event_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.event.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// The whole table as CSV, header first, one line per row.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&csv_field(&row.timestamp));
            out.push(',');
            out.push_str(&csv_field(&row.event));
            out.push(',');
            out.push_str(&row.confidence.to_string());
            out.push('\n');
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).expect("valid time")
    }

    fn detections() -> Vec<Detection> {
        let b = BoundingBox::new(0, 0, 10, 10);
        vec![
            Detection::new("with_mask", 0.91, b),
            Detection::new("without_mask", 0.87, b),
            Detection::new("mask_weared_incorrect", 0.6, b),
            Detection::new("without_mask", 0.55, b),
        ]
    }

    #[test]
    fn records_one_row_per_matching_detection() {
        let mut log = ViolationLog::default();
        assert_eq!(log.record(&detections(), at(9, 5, 3)), 2);
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.rows()[0],
            ViolationRecord {
                timestamp: "09:05:03".to_string(),
                event: "No Mask".to_string(),
                confidence: 0.87,
            }
        );
        assert_eq!(log.rows()[1].confidence, 0.55);
        assert_eq!(log.record(&[], at(9, 5, 4)), 0);
    }

    #[test]
    fn tail_returns_latest_rows_in_order() {
        let mut log = ViolationLog::default();
        for s in 0..5 {
            log.record(&detections()[1..2], at(12, 0, s));
        }
        let tail: Vec<_> = log.tail(2).iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(tail, ["12:00:03", "12:00:04"]);
        assert_eq!(log.tail(50).len(), 5);
    }

    #[test]
    fn csv_has_header_and_quotes_awkward_fields() {
        let mut log = ViolationLog::new(ViolationRule::new("without_mask", "No Mask, \"critical\""));
        log.record(&detections()[1..2], at(23, 59, 59));
        assert_eq!(
            log.to_csv(),
            "Timestamp,Event,Confidence\n23:59:59,\"No Mask, \"\"critical\"\"\",0.87\n"
        );
        assert_eq!(ViolationLog::default().to_csv(), "Timestamp,Event,Confidence\n");
    }

    #[test]
    fn event_counts_group_by_event_name() {
        let mut log = ViolationLog::default();
        log.record(&detections(), at(8, 0, 0));
        log.record(&detections(), at(8, 0, 1));
        assert_eq!(log.event_counts().get("No Mask"), Some(&4));
        log.clear();
        assert!(log.is_empty());
    }
}
