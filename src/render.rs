//! Render surface capability.

use kurbo::{Circle, Rect};

use crate::assets::PreparedImage;
use crate::cover::CropRect;
use crate::error::RingframeResult;

/// One read-back frame.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, tightly packed.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Drawing capability the compositor is given instead of any ambient
/// canvas: clear, circular clipping, and region-scaled image draws.
pub trait RenderSurface {
    /// Surface dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Push a circular clip; subsequent draws are masked to the circle.
    fn push_circle_clip(&mut self, circle: Circle) -> RingframeResult<()>;

    /// Pop the innermost clip. Unbalanced pops are a validation error.
    fn pop_clip(&mut self) -> RingframeResult<()>;

    /// Draw `src` (a region of `image` in source pixel coordinates)
    /// stretched onto `dst` in surface coordinates, source-over, honoring
    /// the active clip. `dst` may extend past the surface; the overflow is
    /// discarded.
    fn draw_image_region(
        &mut self,
        image: &PreparedImage,
        src: CropRect,
        dst: Rect,
    ) -> RingframeResult<()>;

    /// Copy the surface out as straight-alpha RGBA8.
    fn readback_rgba8(&self) -> RingframeResult<FrameRgba>;
}
