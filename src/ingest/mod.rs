//! Frame sources.
//!
//! - Local image files (batch audit)
//! - Synthetic `stub://` frames (live-loop demos and tests)
//!
//! Sources hand out owned `Frame`s laid out in the configured channel order.
//! Running out of frames is `Ok(None)`, so a host loop can stop or skip;
//! decode and I/O failures are errors carrying the offending path.

pub mod file;
pub mod synthetic;

pub use file::{FileConfig, FileSource, FileStats};
pub use synthetic::{SyntheticConfig, SyntheticSource, SyntheticStats};

fn is_local_path(path: &str) -> bool {
    !path.trim().is_empty() && !path.contains("://")
}
