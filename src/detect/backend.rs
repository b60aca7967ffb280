use anyhow::Result;

use crate::detect::result::Detection;
use crate::frame::Frame;

/// Detector backend trait.
///
/// The annotator and the violation log never call a backend; the host loop
/// does, then hands the same detection list to both. Backends see the frame
/// read-only and must not retain it past the `detect` call.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Labels this backend can emit, in class-id order.
    fn class_names(&self) -> &[String];

    /// Run detection on a frame. Boxes are expected in frame pixel
    /// coordinates; the annotator clamps anything that strays off-frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
