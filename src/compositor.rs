//! Layered composite: circular photo crop beneath the frame overlay.

use crate::assets::PreparedImage;
use crate::config::FrameProfile;
use crate::cover::{CropRect, compute_cover};
use crate::error::{RingframeError, RingframeResult};
use crate::render::RenderSurface;

/// Draws the composite in a fixed order: clear, circular clip, cover-fit
/// photo, unclip, overlay. The overlay may arrive after the first
/// composite; while it is pending, at most one deferred overlay draw is
/// kept and fires when the overlay is installed.
pub struct Compositor {
    profile: FrameProfile,
    overlay: Option<PreparedImage>,
    overlay_deferred: bool,
}

impl Compositor {
    pub fn new(profile: FrameProfile) -> RingframeResult<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            overlay: None,
            overlay_deferred: false,
        })
    }

    pub fn profile(&self) -> &FrameProfile {
        &self.profile
    }

    /// True when a composite has run without an installed overlay and is
    /// still waiting for it.
    pub fn overlay_pending_draw(&self) -> bool {
        self.overlay_deferred
    }

    /// Install the one fixed overlay image. If a composite already ran
    /// while the overlay was pending, the deferred draw fires now, exactly
    /// once; returns whether it drew.
    pub fn install_overlay(
        &mut self,
        surface: &mut dyn RenderSurface,
        overlay: PreparedImage,
    ) -> RingframeResult<bool> {
        if self.overlay.is_some() {
            return Err(RingframeError::validation(
                "overlay is fixed and may only be installed once",
            ));
        }
        self.overlay = Some(overlay);

        if self.overlay_deferred {
            self.overlay_deferred = false;
            self.draw_overlay(surface)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Render the full composite for `photo` onto `surface`.
    #[tracing::instrument(skip(self, surface, photo), fields(w = photo.width, h = photo.height))]
    pub fn composite(
        &mut self,
        surface: &mut dyn RenderSurface,
        photo: &PreparedImage,
    ) -> RingframeResult<()> {
        let (sw, sh) = surface.size();
        if (sw, sh) != (self.profile.canvas_size, self.profile.canvas_size) {
            return Err(RingframeError::validation(
                "surface does not match the profile canvas size",
            ));
        }

        surface.clear();

        surface.push_circle_clip(self.profile.mask_circle())?;
        let crop = compute_cover(
            f64::from(photo.width),
            f64::from(photo.height),
            f64::from(self.profile.canvas_size),
            f64::from(self.profile.canvas_size),
        );
        surface.draw_image_region(photo, crop, self.profile.canvas_rect())?;
        surface.pop_clip()?;

        // The overlay must not be affected by the mask, so it is drawn
        // after the clip is released.
        if self.overlay.is_some() {
            self.overlay_deferred = false;
            self.draw_overlay(surface)?;
        } else {
            // Coalesce: only the most recent composite keeps a pending draw.
            self.overlay_deferred = true;
            tracing::debug!("overlay not ready, deferring overlay draw");
        }

        Ok(())
    }

    fn draw_overlay(&self, surface: &mut dyn RenderSurface) -> RingframeResult<()> {
        let overlay = self
            .overlay
            .as_ref()
            .ok_or_else(|| RingframeError::validation("no overlay installed"))?;
        let src = CropRect {
            x: 0.0,
            y: 0.0,
            width: f64::from(overlay.width),
            height: f64::from(overlay.height),
        };
        surface.draw_image_region(overlay, src, self.profile.overlay_rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{FrameRgba, RenderSurface};
    use crate::render_cpu::CpuSurface;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PreparedImage {
        let mut buf = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            buf.extend_from_slice(&rgba);
        }
        PreparedImage::from_straight_rgba8(width, height, buf).unwrap()
    }

    fn small_profile() -> FrameProfile {
        FrameProfile {
            canvas_size: 64,
            mask_inset: 4.0,
            ..FrameProfile::default()
        }
    }

    fn px(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * frame.width + x) * 4) as usize;
        [
            frame.data[idx],
            frame.data[idx + 1],
            frame.data[idx + 2],
            frame.data[idx + 3],
        ]
    }

    #[test]
    fn photo_is_masked_to_the_circle() {
        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(64, 64).unwrap();
        let photo = solid(8, 8, [255, 0, 0, 255]);

        comp.composite(&mut surface, &photo).unwrap();
        let frame = surface.readback_rgba8().unwrap();

        // Corner is outside the circle (radius 28 around the center).
        assert_eq!(px(&frame, 0, 0)[3], 0);
        assert_eq!(px(&frame, 63, 63)[3], 0);
        assert_eq!(px(&frame, 32, 32), [255, 0, 0, 255]);
    }

    #[test]
    fn overlay_draws_on_top_and_unclipped() {
        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(64, 64).unwrap();

        comp.install_overlay(&mut surface, solid(8, 8, [0, 255, 0, 255]))
            .unwrap();
        comp.composite(&mut surface, &solid(8, 8, [255, 0, 0, 255]))
            .unwrap();

        let frame = surface.readback_rgba8().unwrap();
        // Opaque overlay wins over the photo inside the circle...
        assert_eq!(px(&frame, 32, 32), [0, 255, 0, 255]);
        // ...and lands outside the mask too (1.09x overdraw, no clip).
        assert_eq!(px(&frame, 0, 0), [0, 255, 0, 255]);
        assert!(!comp.overlay_pending_draw());
    }

    #[test]
    fn pending_overlay_coalesces_and_fires_once() {
        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(64, 64).unwrap();
        let photo = solid(8, 8, [255, 0, 0, 255]);

        comp.composite(&mut surface, &photo).unwrap();
        comp.composite(&mut surface, &photo).unwrap();
        assert!(comp.overlay_pending_draw());

        let drew = comp
            .install_overlay(&mut surface, solid(8, 8, [0, 0, 255, 255]))
            .unwrap();
        assert!(drew);
        assert!(!comp.overlay_pending_draw());

        let frame = surface.readback_rgba8().unwrap();
        assert_eq!(px(&frame, 32, 32), [0, 0, 255, 255]);
    }

    #[test]
    fn install_without_pending_draw_does_not_draw() {
        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(64, 64).unwrap();

        let drew = comp
            .install_overlay(&mut surface, solid(8, 8, [0, 255, 0, 255]))
            .unwrap();
        assert!(!drew);

        let frame = surface.readback_rgba8().unwrap();
        assert!(frame.data.iter().all(|&b| b == 0), "canvas still blank");
    }

    #[test]
    fn overlay_may_only_be_installed_once() {
        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(64, 64).unwrap();
        comp.install_overlay(&mut surface, solid(2, 2, [1, 1, 1, 255]))
            .unwrap();
        assert!(
            comp.install_overlay(&mut surface, solid(2, 2, [2, 2, 2, 255]))
                .is_err()
        );
    }

    #[test]
    fn composite_rejects_mismatched_surface() {
        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(32, 32).unwrap();
        let err = comp.composite(&mut surface, &solid(2, 2, [1, 1, 1, 255]));
        assert!(err.is_err());
    }

    #[test]
    fn wide_photo_is_center_cropped() {
        // Left third blue, middle third red, right third blue: after the
        // cover crop of a 3:1 source onto a square only the middle
        // remains.
        let mut buf = Vec::new();
        for _y in 0..8 {
            for x in 0..24 {
                if (8..16).contains(&x) {
                    buf.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    buf.extend_from_slice(&[0, 0, 255, 255]);
                }
            }
        }
        let photo = PreparedImage::from_straight_rgba8(24, 8, buf).unwrap();

        let mut comp = Compositor::new(small_profile()).unwrap();
        let mut surface = CpuSurface::new(64, 64).unwrap();
        comp.composite(&mut surface, &photo).unwrap();

        let frame = surface.readback_rgba8().unwrap();
        assert_eq!(px(&frame, 32, 32), [255, 0, 0, 255]);
        // Points inside the circle but left/right of center still map to
        // the red middle third of the source.
        assert_eq!(px(&frame, 12, 32), [255, 0, 0, 255]);
        assert_eq!(px(&frame, 52, 32), [255, 0, 0, 255]);
    }
}
