//! PNG serialization of a rendered frame, with a fallback encode path and
//! a data-URL form.

use std::borrow::Cow;

use base64::Engine as _;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder as _};

use crate::composite_cpu::unpremultiply_rgba8_in_place;
use crate::error::{RingframeError, RingframeResult};
use crate::render::FrameRgba;

/// Encode a frame as PNG at maximum quality.
///
/// The best-compression encoder is tried first; any failure there is
/// dropped and a default-settings encode is attempted instead. Only the
/// fallback's failure is surfaced. An empty byte stream from either path
/// counts as failure.
pub fn encode_png(frame: &FrameRgba) -> RingframeResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .checked_mul(frame.height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| RingframeError::encode("frame size overflow"))?;
    if frame.data.len() != expected {
        return Err(RingframeError::encode(
            "frame buffer must be width*height*4 bytes",
        ));
    }

    let data: Cow<'_, [u8]> = if frame.premultiplied {
        let mut straight = frame.data.clone();
        unpremultiply_rgba8_in_place(&mut straight)?;
        Cow::Owned(straight)
    } else {
        Cow::Borrowed(&frame.data)
    };

    match encode_with(&data, frame, CompressionType::Best, FilterType::Adaptive) {
        Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
        _ => {}
    }

    let bytes = encode_with(&data, frame, CompressionType::Default, FilterType::Adaptive)
        .map_err(|e| RingframeError::encode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(RingframeError::encode("encoder produced an empty stream"));
    }
    Ok(bytes)
}

/// Encode a frame as a `data:image/png;base64,` URL with pixel content
/// identical to [`encode_png`].
pub fn encode_png_data_url(frame: &FrameRgba) -> RingframeResult<String> {
    let png = encode_png(frame)?;
    let mut url = String::from("data:image/png;base64,");
    base64::engine::general_purpose::STANDARD.encode_string(&png, &mut url);
    Ok(url)
}

fn encode_with(
    data: &[u8],
    frame: &FrameRgba,
    compression: CompressionType,
    filter: FilterType,
) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, compression, filter);
    encoder.write_image(data, frame.width, frame.height, ExtendedColorType::Rgba8)?;
    Ok(buf)
}
