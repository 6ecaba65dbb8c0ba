//! Canvas sizing.
//!
//! The canvas is absolutely positioned and has to span the whole rendered
//! page, not just the viewport. Browsers disagree about which of the
//! body/document scroll, offset and client heights reflects the real content
//! height, so the largest one wins.

use crate::env::PageMetrics;

/// Logical size of the drawing area and the backing buffer that holds it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceLayout {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub backing_width: u32,
    pub backing_height: u32,
}

impl SurfaceLayout {
    pub fn measure(metrics: &PageMetrics, device_pixel_ratio: f64, max_scale: f64) -> Self {
        let width = logical_width(metrics);
        let height = page_height(metrics);
        let scale = device_scale(device_pixel_ratio, max_scale);
        Self {
            width,
            height,
            scale,
            backing_width: backing_px(width, scale),
            backing_height: backing_px(height, scale),
        }
    }
}

pub fn page_height(metrics: &PageMetrics) -> f64 {
    metrics
        .heights
        .iter()
        .copied()
        .filter(|h| h.is_finite())
        .fold(0.0, f64::max)
}

/// Layout width of the canvas, or the document's when the canvas hasn't
/// been laid out yet.
pub fn logical_width(metrics: &PageMetrics) -> f64 {
    if metrics.surface_width > 0.0 {
        metrics.surface_width
    } else {
        metrics.document_width.max(0.0)
    }
}

pub fn device_scale(device_pixel_ratio: f64, max_scale: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(max_scale)
    } else {
        1.0
    }
}

fn backing_px(logical: f64, scale: f64) -> u32 {
    (logical * scale).round().clamp(0.0, u32::MAX as f64) as u32
}

/// 2D drawing target. Coordinates are logical; implementations apply the
/// device scale from the last [`Surface::resize`].
pub trait Surface {
    /// Match the backing buffer and transform to `layout`.
    fn resize(&mut self, layout: &SurfaceLayout);
    fn clear(&mut self, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);
    fn set_alpha(&mut self, alpha: f64);
    /// Draw the petal sprite scaled into the given rectangle.
    fn draw_sprite(&mut self, x: f64, y: f64, width: f64, height: f64);
}
