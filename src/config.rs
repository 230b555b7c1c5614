//! Frame profile: canvas constants as a validated, JSON-loadable value.

use std::io::Read;

use kurbo::{Circle, Point, Rect};

use crate::error::{RingframeError, RingframeResult};

/// Geometry and output settings for one frame style.
///
/// Defaults are the shipped LinkedIn-badge profile: 1080x1080 canvas, a
/// 40 px mask inset (circle radius 500), and a 1.09x overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameProfile {
    /// Output edge length in pixels (the canvas is square).
    pub canvas_size: u32,
    /// Inset from the canvas edge to the circular mask, in pixels.
    pub mask_inset: f64,
    /// Overlay scale relative to the canvas edge length.
    pub overlay_scale: f64,
    /// Suggested file name for the exported PNG.
    pub output_name: String,
}

impl Default for FrameProfile {
    fn default() -> Self {
        Self {
            canvas_size: 1080,
            mask_inset: 40.0,
            overlay_scale: 1.09,
            output_name: "linkedin-open-to-work.png".to_string(),
        }
    }
}

impl FrameProfile {
    pub fn from_json_reader(r: impl Read) -> RingframeResult<Self> {
        let profile: Self = serde_json::from_reader(r)
            .map_err(|e| RingframeError::serde(format!("parse frame profile JSON: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> RingframeResult<()> {
        if self.canvas_size == 0 {
            return Err(RingframeError::validation("canvas_size must be >= 1"));
        }
        if !self.mask_inset.is_finite() || self.mask_inset < 0.0 {
            return Err(RingframeError::validation(
                "mask_inset must be finite and >= 0",
            ));
        }
        if self.mask_inset >= f64::from(self.canvas_size) / 2.0 {
            return Err(RingframeError::validation(
                "mask_inset must be smaller than half the canvas",
            ));
        }
        if !self.overlay_scale.is_finite() || self.overlay_scale <= 0.0 {
            return Err(RingframeError::validation(
                "overlay_scale must be finite and > 0",
            ));
        }
        if self.output_name.is_empty() {
            return Err(RingframeError::validation("output_name must be non-empty"));
        }
        Ok(())
    }

    /// Full canvas as a rectangle at the origin.
    pub fn canvas_rect(&self) -> Rect {
        let size = f64::from(self.canvas_size);
        Rect::new(0.0, 0.0, size, size)
    }

    /// Circular photo mask: centered, radius `canvas_size/2 - mask_inset`.
    pub fn mask_circle(&self) -> Circle {
        let size = f64::from(self.canvas_size);
        Circle::new(Point::new(size / 2.0, size / 2.0), size / 2.0 - self.mask_inset)
    }

    /// Destination rectangle for the overlay: scaled by `overlay_scale` and
    /// centered, so it overdraws every canvas edge symmetrically.
    pub fn overlay_rect(&self) -> Rect {
        let size = f64::from(self.canvas_size);
        let edge = size * self.overlay_scale;
        let origin = (size - edge) / 2.0;
        Rect::new(origin, origin, origin + edge, origin + edge)
    }
}
