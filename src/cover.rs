//! Cover-fit crop computation (the `object-fit: cover` policy).

/// Crop window in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Compute the centered source crop that fills `dst_w x dst_h` while
/// preserving the source aspect ratio (excess is cropped symmetrically).
///
/// Equal aspect ratios take the full-width branch and yield the whole
/// source. Callers guarantee positive dimensions; decoded images cannot
/// have zero extents.
pub fn compute_cover(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> CropRect {
    let src_ratio = src_w / src_h;
    let dst_ratio = dst_w / dst_h;

    let (sw, sh) = if src_ratio > dst_ratio {
        // Source relatively wider: keep full height, crop left/right.
        (src_h * dst_ratio, src_h)
    } else {
        // Source relatively taller or equal: keep full width, crop top/bottom.
        (src_w, src_w / dst_ratio)
    };

    CropRect {
        x: (src_w - sw) / 2.0,
        y: (src_h - sh) / 2.0,
        width: sw,
        height: sh,
    }
}
