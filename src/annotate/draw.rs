//! Rectangle primitives and the overlay blend.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::detect::BoundingBox;

/// Opaque fill of the inclusive box. Zero-area boxes draw nothing.
pub(crate) fn fill_box(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    fill_rect(image, bbox.x1, bbox.y1, bbox.width(), bbox.height(), color);
}

/// Border of `thickness` pixels straddling each edge of the inclusive box.
///
/// Each band covers `thickness / 2` pixels outside the edge and the rest on
/// and inside it, mirrored on opposite edges. Edges are axis-aligned on
/// integer coordinates, so every covered pixel is fully covered and the
/// stroke is solid colour.
pub(crate) fn stroke_box(image: &mut RgbImage, bbox: &BoundingBox, thickness: u32, color: Rgb<u8>) {
    if bbox.width() == 0 || bbox.height() == 0 || thickness == 0 {
        return;
    }
    let outer = (thickness / 2) as i32;
    let inner = thickness as i32 - 1 - outer;
    let span_w = bbox.width() + 2 * outer as u32;
    let span_h = bbox.height() + 2 * outer as u32;
    let left = bbox.x1 - outer;
    let top = bbox.y1 - outer;

    fill_rect(image, left, top, span_w, thickness, color);
    fill_rect(image, left, bbox.y2 - inner, span_w, thickness, color);
    fill_rect(image, left, top, thickness, span_h, color);
    fill_rect(image, bbox.x2 - inner, top, thickness, span_h, color);
}

/// Filled rectangle at `(x, y)`; clipped to the image by `imageproc`.
pub(crate) fn fill_rect(image: &mut RgbImage, x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    draw_filled_rect_mut(image, Rect::at(x, y).of_size(w, h), color);
}

/// `base = round(alpha% * overlay + (100 - alpha)% * base)` per channel.
///
/// Integer arithmetic keeps pixels where overlay and base agree exactly
/// unchanged.
pub(crate) fn blend_overlay(base: &mut RgbImage, overlay: &RgbImage, alpha_percent: u32) {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());
    let keep = 100 - alpha_percent.min(100);
    let alpha = 100 - keep;
    for (dst, src) in base.iter_mut().zip(overlay.iter()) {
        *dst = ((*src as u32 * alpha + *dst as u32 * keep + 50) / 100) as u8;
    }
}
