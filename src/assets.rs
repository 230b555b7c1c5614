//! Prepared raster assets and the decode capability.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::error::{RingframeError, RingframeResult};

pub mod decode;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels, >= 1.
    pub width: u32,
    /// Height in pixels, >= 1.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build a prepared image from straight-alpha RGBA8 bytes.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> RingframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(RingframeError::validation(
                "prepared image dimensions must be >= 1",
            ));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RingframeError::validation("prepared image size overflow"))?;
        if rgba8.len() != expected {
            return Err(RingframeError::validation(
                "prepared image buffer must be width*height*4 bytes",
            ));
        }

        decode::premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Premultiplied pixel at `(x, y)`, clamped to the image bounds.
    pub(crate) fn pixel_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let idx = (y * self.width as usize + x) * 4;
        let px = &self.rgba8_premul[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }
}

/// Capability that turns raw file bytes into a [`PreparedImage`].
///
/// Injected into the session so shells and tests can substitute their own
/// decoding (or failure) behavior.
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> RingframeResult<PreparedImage>;
}

/// Read and decode the bundled overlay asset.
///
/// A missing or corrupt overlay is reported to the caller; the caller may
/// keep compositing without an overlay indefinitely.
pub fn load_overlay(path: &Path, decoder: &dyn ImageDecoder) -> RingframeResult<PreparedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read overlay '{}'", path.display()))?;
    decoder.decode(&bytes)
}
