//! Synthetic frame source (`stub://`).
//!
//! Produces a moving colour gradient so downstream stages, in particular the
//! stub detector, see a changing scene without any camera or file.

use anyhow::{anyhow, Result};

use crate::frame::{ChannelOrder, Frame};

#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Must start with `stub://`; the remainder names the virtual camera.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub channel_order: ChannelOrder,
    /// Stop after this many frames; `None` runs until the caller stops.
    pub frame_limit: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            url: "stub://front_camera".to_string(),
            width: 640,
            height: 480,
            channel_order: ChannelOrder::Rgb,
            frame_limit: None,
        }
    }
}

pub struct SyntheticSource {
    config: SyntheticConfig,
    frame_count: u64,
    connected: bool,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Result<Self> {
        if !config.url.starts_with("stub://") {
            return Err(anyhow!(
                "synthetic source requires a stub:// url, got '{}'",
                config.url
            ));
        }
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!("synthetic source dimensions must be non-zero"));
        }
        Ok(Self {
            config,
            frame_count: 0,
            connected: false,
        })
    }

    pub fn connect(&mut self) -> Result<()> {
        self.connected = true;
        log::info!(
            "SyntheticSource: connected to {} ({}x{})",
            self.config.url,
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    /// Next generated frame, or `None` once the frame limit is reached.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if !self.connected {
            return Err(anyhow!("synthetic source is not connected"));
        }
        if self
            .config
            .frame_limit
            .is_some_and(|limit| self.frame_count >= limit)
        {
            return Ok(None);
        }
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Frame::from_raw(
            pixels,
            self.config.width,
            self.config.height,
            self.config.channel_order,
        )
        .map(Some)
    }

    fn generate_pixels(&self) -> Vec<u8> {
        let (w, h) = (self.config.width as u64, self.config.height as u64);
        let shift = self.frame_count * 3;
        let mut pixels = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                pixels.push(((x * 255 / w + shift) % 256) as u8);
                pixels.push(((y * 255 / h + shift / 2) % 256) as u8);
                pixels.push(((x + y + shift) % 256) as u8);
            }
        }
        pixels
    }

    pub fn stats(&self) -> SyntheticStats {
        SyntheticStats {
            frames_generated: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticStats {
    pub frames_generated: u64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_stub_urls() {
        let config = SyntheticConfig {
            url: "rtsp://camera".to_string(),
            ..SyntheticConfig::default()
        };
        assert!(SyntheticSource::new(config).is_err());
    }

    #[test]
    fn stops_at_frame_limit() -> Result<()> {
        let mut source = SyntheticSource::new(SyntheticConfig {
            width: 32,
            height: 16,
            frame_limit: Some(3),
            ..SyntheticConfig::default()
        })?;
        assert!(source.next_frame().is_err());
        source.connect()?;

        let first = source.next_frame()?.expect("frame 1");
        let second = source.next_frame()?.expect("frame 2");
        assert_eq!((first.width(), first.height()), (32, 16));
        assert_ne!(first, second);
        assert!(source.next_frame()?.is_some());
        assert!(source.next_frame()?.is_none());
        assert_eq!(source.stats().frames_generated, 3);
        Ok(())
    }
}
