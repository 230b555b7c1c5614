use image::{DynamicImage, ImageFormat};

use crate::assets::{ImageDecoder, PreparedImage};
use crate::error::{RingframeError, RingframeResult};

/// Default decode capability backed by the `image` crate.
pub struct StandardDecoder;

impl ImageDecoder for StandardDecoder {
    fn decode(&self, bytes: &[u8]) -> RingframeResult<PreparedImage> {
        decode_image(bytes)
    }
}

/// Formats attempted by the fallback path, broadest first.
const FALLBACK_FORMATS: [ImageFormat; 6] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// Decode raw file bytes into a premultiplied RGBA8 image.
///
/// Tries format sniffing first; on any sniffing failure falls back to
/// explicit per-format decodes, and only the fallback's failure is
/// surfaced.
pub fn decode_image(bytes: &[u8]) -> RingframeResult<PreparedImage> {
    let dyn_img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(_) => decode_fallback(bytes)?,
    };

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: std::sync::Arc::new(rgba8_premul),
    })
}

fn decode_fallback(bytes: &[u8]) -> RingframeResult<DynamicImage> {
    for format in FALLBACK_FORMATS {
        if let Ok(img) = image::load_from_memory_with_format(bytes, format) {
            tracing::debug!(?format, "decoded via explicit-format fallback");
            return Ok(img);
        }
    }
    Err(RingframeError::decode(
        "unrecognized or unsupported image data",
    ))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        if a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
