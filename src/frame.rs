//! Frame buffers.
//!
//! - `Frame`: height x width x 3 pixel buffer, 8 bits per channel.
//! - `ChannelOrder`: the byte layout of each pixel (RGB or BGR).
//!
//! The channel order is fixed by the host pipeline and carried by the frame.
//! Drawing code converts logical colours into the frame's order; nothing
//! inspects pixel content to guess the layout, so a mismatched order silently
//! produces swapped colours.

use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::palette::Color;

// ----------------------------------------------------------------------------
// ChannelOrder
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Lay out a logical colour as pixel bytes in this order.
    pub fn encode(self, color: Color) -> Rgb<u8> {
        match self {
            ChannelOrder::Rgb => Rgb([color.r, color.g, color.b]),
            ChannelOrder::Bgr => Rgb([color.b, color.g, color.r]),
        }
    }

    /// Read pixel bytes in this order back into a logical colour.
    pub fn decode(self, pixel: Rgb<u8>) -> Color {
        let [a, b, c] = pixel.0;
        match self {
            ChannelOrder::Rgb => Color::new(a, b, c),
            ChannelOrder::Bgr => Color::new(c, b, a),
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            other => Err(anyhow!(
                "unknown channel order '{}' (expected rgb or bgr)",
                other
            )),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelOrder::Rgb => f.write_str("rgb"),
            ChannelOrder::Bgr => f.write_str("bgr"),
        }
    }
}

// ----------------------------------------------------------------------------
// Frame
// ----------------------------------------------------------------------------

/// Three-channel 8-bit frame with a fixed channel order.
///
/// Dimensions are always non-zero. Annotation never resizes or reformats a
/// frame: outputs have the same width, height and order as their input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pixels: RgbImage,
    order: ChannelOrder,
}

impl Frame {
    /// Black frame of the given size.
    pub fn new(width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbImage::new(width, height),
            order,
        })
    }

    /// Frame filled with a single logical colour.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, color: Color) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbImage::from_pixel(width, height, order.encode(color)),
            order,
        })
    }

    /// Wrap raw interleaved bytes already laid out in `order`.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "frame length mismatch: expected {}, got {}",
                expected,
                data.len()
            ));
        }
        let pixels = RgbImage::from_raw(width, height, data)
            .ok_or_else(|| anyhow!("frame buffer rejected for {}x{}", width, height))?;
        Ok(Self { pixels, order })
    }

    /// Convert a decoded RGB image (as produced by the `image` crate) into a
    /// frame laid out in `order`.
    pub fn from_rgb_image(mut image: RgbImage, order: ChannelOrder) -> Result<Self> {
        check_dimensions(image.width(), image.height())?;
        if order == ChannelOrder::Bgr {
            swap_red_blue(&mut image);
        }
        Ok(Self {
            pixels: image,
            order,
        })
    }

    /// Copy of this frame in RGB order, ready for the `image` encoders.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut image = self.pixels.clone();
        if self.order == ChannelOrder::Bgr {
            swap_red_blue(&mut image);
        }
        image
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Interleaved pixel bytes in the frame's channel order.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Logical colour at `(x, y)`. Panics when out of bounds, like `image`.
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        self.order.decode(*self.pixels.get_pixel(x, y))
    }

    /// Pixel bytes at `(x, y)` in the frame's channel order.
    pub fn raw_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.order == other.order
    }

    pub(crate) fn image(&self) -> &RgbImage {
        &self.pixels
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.pixels
    }

    /// Pixel bytes for a logical colour in this frame's order.
    pub(crate) fn encode(&self, color: Color) -> Rgb<u8> {
        self.order.encode(color)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(anyhow!(
            "frame dimensions must be non-zero, got {}x{}",
            width,
            height
        ));
    }
    Ok(())
}

fn swap_red_blue(image: &mut RgbImage) {
    for pixel in image.pixels_mut() {
        pixel.0.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_validates_length() {
        assert!(Frame::from_raw(vec![0u8; 12], 2, 2, ChannelOrder::Rgb).is_ok());
        let err = Frame::from_raw(vec![0u8; 11], 2, 2, ChannelOrder::Rgb).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Frame::new(0, 10, ChannelOrder::Rgb).is_err());
        assert!(Frame::from_raw(Vec::new(), 0, 0, ChannelOrder::Bgr).is_err());
    }

    #[test]
    fn bgr_round_trips_through_rgb_image() -> Result<()> {
        let mut image = RgbImage::new(1, 1);
        image.put_pixel(0, 0, Rgb([10, 20, 30]));

        let frame = Frame::from_rgb_image(image.clone(), ChannelOrder::Bgr)?;
        assert_eq!(frame.raw_pixel(0, 0), [30, 20, 10]);
        assert_eq!(frame.color_at(0, 0), Color::new(10, 20, 30));
        assert_eq!(frame.to_rgb_image(), image);
        Ok(())
    }

    #[test]
    fn channel_order_parses_case_insensitively() {
        assert_eq!("BGR".parse::<ChannelOrder>().unwrap(), ChannelOrder::Bgr);
        assert_eq!(" rgb ".parse::<ChannelOrder>().unwrap(), ChannelOrder::Rgb);
        assert!("rgba".parse::<ChannelOrder>().is_err());
    }
}
