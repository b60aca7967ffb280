use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{BoundingBox, Detection};
use crate::frame::Frame;
use crate::palette::DEFAULT_CLASSES;

const MAX_DETECTIONS: usize = 3;
const BYTES_PER_DETECTION: usize = 5;

/// Stub backend for demos and tests.
///
/// Hashes the frame pixels and derives up to three boxes from the digest,
/// so identical frames always produce identical detections.
pub struct StubBackend {
    class_names: Vec<String>,
    frames_seen: u64,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            class_names: DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect(),
            frames_seen: 0,
        }
    }

    pub fn with_classes(class_names: Vec<String>) -> Result<Self> {
        if class_names.is_empty() {
            return Err(anyhow!("stub backend needs at least one class name"));
        }
        Ok(Self {
            class_names,
            frames_seen: 0,
        })
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        self.frames_seen += 1;
        if self.class_names.is_empty() {
            return Ok(Vec::new());
        }

        let digest: [u8; 32] = Sha256::digest(frame.as_bytes()).into();
        let count = digest[0] as usize % (MAX_DETECTIONS + 1);
        let width = frame.width();
        let height = frame.height();
        let min_side = width.min(height);

        let detections = digest[1..]
            .chunks_exact(BYTES_PER_DETECTION)
            .take(count)
            .map(|chunk| {
                let class = &self.class_names[chunk[0] as usize % self.class_names.len()];
                let confidence = (0.30 + (chunk[1] as f32 / 255.0) * 0.69).min(0.99);
                let cx = (chunk[2] as u32 * width / 256) as i32;
                let cy = (chunk[3] as u32 * height / 256) as i32;
                let half = ((min_side / 16).max(1) + chunk[4] as u32 * min_side / 1024) as i32;
                let bbox = BoundingBox::new(cx - half, cy - half, cx + half, cy + half)
                    .clamp_to(width, height);
                Detection::new(class.clone(), confidence, bbox)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "stub backend: frame {} produced {} detections",
            self.frames_seen,
            detections.len()
        );
        Ok(detections)
    }
}
