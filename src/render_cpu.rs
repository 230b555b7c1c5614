//! CPU implementation of [`RenderSurface`] over a premultiplied RGBA8
//! buffer, with bilinear sampling and an antialiased circular clip.

use kurbo::{Circle, Point, Rect};

use crate::assets::PreparedImage;
use crate::composite_cpu::{over, scale_coverage};
use crate::cover::CropRect;
use crate::error::{RingframeError, RingframeResult};
use crate::render::{FrameRgba, RenderSurface};

pub struct CpuSurface {
    width: u32,
    height: u32,
    /// Row-major premultiplied RGBA8.
    pixels: Vec<u8>,
    clips: Vec<Circle>,
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> RingframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(RingframeError::validation(
                "surface dimensions must be >= 1",
            ));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RingframeError::validation("surface size overflow"))?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
            clips: Vec::new(),
        })
    }

    /// Combined clip coverage at a point, 0.0 (fully clipped) to 1.0.
    fn clip_coverage(&self, p: Point) -> f64 {
        self.clips
            .iter()
            .fold(1.0, |acc, c| acc * circle_coverage(c, p))
    }
}

/// ~1 px antialiased coverage of `p` by `circle`.
fn circle_coverage(circle: &Circle, p: Point) -> f64 {
    let d = circle.center.distance(p);
    (circle.radius - d + 0.5).clamp(0.0, 1.0)
}

fn sample_bilinear(image: &PreparedImage, sx: f64, sy: f64) -> [u8; 4] {
    let fx = sx.floor();
    let fy = sy.floor();
    let tx = sx - fx;
    let ty = sy - fy;
    let x0 = fx as i64;
    let y0 = fy as i64;

    let p00 = image.pixel_clamped(x0, y0);
    let p10 = image.pixel_clamped(x0 + 1, y0);
    let p01 = image.pixel_clamped(x0, y0 + 1);
    let p11 = image.pixel_clamped(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(p00[i]) * (1.0 - tx) + f64::from(p10[i]) * tx;
        let bottom = f64::from(p01[i]) * (1.0 - tx) + f64::from(p11[i]) * tx;
        out[i] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

impl RenderSurface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn push_circle_clip(&mut self, circle: Circle) -> RingframeResult<()> {
        if !circle.radius.is_finite() || circle.radius <= 0.0 {
            return Err(RingframeError::validation(
                "clip circle radius must be finite and > 0",
            ));
        }
        self.clips.push(circle);
        Ok(())
    }

    fn pop_clip(&mut self) -> RingframeResult<()> {
        self.clips
            .pop()
            .map(|_| ())
            .ok_or_else(|| RingframeError::validation("pop_clip without a matching push"))
    }

    fn draw_image_region(
        &mut self,
        image: &PreparedImage,
        src: CropRect,
        dst: Rect,
    ) -> RingframeResult<()> {
        for v in [src.x, src.y, src.width, src.height, dst.x0, dst.y0, dst.x1, dst.y1] {
            if !v.is_finite() {
                return Err(RingframeError::validation(
                    "draw rectangles must be finite",
                ));
            }
        }
        if src.width <= 0.0 || src.height <= 0.0 {
            return Err(RingframeError::validation(
                "source region must have positive extent",
            ));
        }
        if dst.width() <= 0.0 || dst.height() <= 0.0 {
            return Err(RingframeError::validation(
                "destination rect must have positive extent",
            ));
        }

        let scale_x = src.width / dst.width();
        let scale_y = src.height / dst.height();

        let x_start = dst.x0.floor().max(0.0) as u32;
        let x_end = dst.x1.ceil().clamp(0.0, f64::from(self.width)) as u32;
        let y_start = dst.y0.floor().max(0.0) as u32;
        let y_end = dst.y1.ceil().clamp(0.0, f64::from(self.height)) as u32;

        for y in y_start..y_end {
            let cy = f64::from(y) + 0.5;
            if cy < dst.y0 || cy >= dst.y1 {
                continue;
            }
            for x in x_start..x_end {
                let cx = f64::from(x) + 0.5;
                if cx < dst.x0 || cx >= dst.x1 {
                    continue;
                }

                let coverage = self.clip_coverage(Point::new(cx, cy));
                if coverage <= 0.0 {
                    continue;
                }

                let sx = src.x + (cx - dst.x0) * scale_x - 0.5;
                let sy = src.y + (cy - dst.y0) * scale_y - 0.5;
                let sampled = sample_bilinear(image, sx, sy);
                let masked = scale_coverage(sampled, (coverage * 255.0).round() as u8);

                let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
                let current = [
                    self.pixels[idx],
                    self.pixels[idx + 1],
                    self.pixels[idx + 2],
                    self.pixels[idx + 3],
                ];
                self.pixels[idx..idx + 4].copy_from_slice(&over(current, masked));
            }
        }

        Ok(())
    }

    fn readback_rgba8(&self) -> RingframeResult<FrameRgba> {
        let mut data = self.pixels.clone();
        crate::composite_cpu::unpremultiply_rgba8_in_place(&mut data)?;
        Ok(FrameRgba {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        })
    }
}
