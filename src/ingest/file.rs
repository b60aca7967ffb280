//! Local image-file frame source.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use super::is_local_path;
use crate::frame::{ChannelOrder, Frame};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Configuration for a local file source.
#[derive(Clone, Debug, Default)]
pub struct FileConfig {
    /// Images to read, in order.
    pub paths: Vec<PathBuf>,
    pub channel_order: ChannelOrder,
}

/// Reads image files one at a time and converts them into frames.
pub struct FileSource {
    config: FileConfig,
    next_index: usize,
}

impl FileSource {
    pub fn new(config: FileConfig) -> Result<Self> {
        for path in &config.paths {
            if !is_local_path(&path.to_string_lossy()) {
                return Err(anyhow!(
                    "file source only supports local paths (no URL schemes): {}",
                    path.display()
                ));
            }
        }
        Ok(Self {
            config,
            next_index: 0,
        })
    }

    /// Every supported image directly inside `dir`, sorted by file name.
    pub fn from_dir(dir: &Path, channel_order: ChannelOrder) -> Result<Self> {
        Self::from_inputs(&[dir.to_path_buf()], channel_order)
    }

    /// Files are taken as given; directories expand to the supported images
    /// directly inside them, sorted by file name.
    pub fn from_inputs(inputs: &[PathBuf], channel_order: ChannelOrder) -> Result<Self> {
        let mut paths = Vec::new();
        for input in inputs {
            if input.is_dir() {
                let listed = list_images(input)?;
                log::info!(
                    "FileSource: {} images found in {}",
                    listed.len(),
                    input.display()
                );
                paths.extend(listed);
            } else {
                paths.push(input.clone());
            }
        }
        Self::new(FileConfig {
            paths,
            channel_order,
        })
    }

    /// Decode the next image. `None` once every path has been read.
    pub fn next_frame(&mut self) -> Result<Option<(PathBuf, Frame)>> {
        let Some(path) = self.config.paths.get(self.next_index).cloned() else {
            return Ok(None);
        };
        self.next_index += 1;
        let image = image::open(&path)
            .with_context(|| format!("failed to decode image {}", path.display()))?
            .to_rgb8();
        let frame = Frame::from_rgb_image(image, self.config.channel_order)
            .with_context(|| format!("unusable image {}", path.display()))?;
        Ok(Some((path, frame)))
    }

    pub fn len(&self) -> usize {
        self.config.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.paths.is_empty()
    }

    pub fn stats(&self) -> FileStats {
        FileStats {
            frames_read: self.next_index as u64,
            remaining: (self.config.paths.len() - self.next_index) as u64,
        }
    }
}

/// Statistics for a file source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStats {
    pub frames_read: u64,
    pub remaining: u64,
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list image directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
