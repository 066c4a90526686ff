use image::RgbaImage;

use crate::composite::blend;
use crate::config::DisposalPolicy;
use crate::decode::animated::{AnimatedImage, Disposal, RawFrame, decode_animation};
use crate::foundation::core::Rect;
use crate::foundation::error::GiftermResult;

/// One fully painted canvas-sized frame and its display delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositedFrame {
    /// Canvas snapshot in straight-alpha RGBA8.
    pub image: RgbaImage,
    /// Display delay in hundredths of a second.
    pub delay_cs: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PaintMode {
    Replace,
    Over,
}

/// Turns an [`AnimatedImage`] into full-canvas frames.
///
/// With [`DisposalPolicy::Overpaint`] every frame is painted over the persistent canvas and
/// nothing is ever restored, so frame `k` holds the cumulative overpaint of frames `0..=k`.
/// [`DisposalPolicy::Honor`] applies each frame's disposal directive before the next paint.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor {
    disposal: DisposalPolicy,
}

impl Compositor {
    /// Compositor with the given disposal policy.
    pub fn new(disposal: DisposalPolicy) -> Self {
        Self { disposal }
    }

    /// Composite every frame. The output has exactly one frame per input frame, delays copied.
    #[tracing::instrument(skip(anim), fields(frames = anim.len()))]
    pub fn composite(&self, anim: &AnimatedImage) -> GiftermResult<Vec<CompositedFrame>> {
        let bounds = anim.bounds();
        let mut canvas = RgbaImage::new(bounds.width(), bounds.height());
        let mut restore_point: Option<RgbaImage> = None;
        let mut out = Vec::with_capacity(anim.len());

        let frames = anim.frames();
        for (idx, (frame, &delay_cs)) in frames.iter().zip(anim.delays_cs()).enumerate() {
            if idx == 0 {
                if self.disposal == DisposalPolicy::Honor && frame.disposal == Disposal::Previous {
                    restore_point = Some(canvas.clone());
                }
                paint(&mut canvas, bounds, frame, PaintMode::Replace);
            } else {
                if self.disposal == DisposalPolicy::Honor {
                    let prev = &frames[idx - 1];
                    match prev.disposal {
                        Disposal::Keep => {}
                        Disposal::Background => clear(&mut canvas, bounds, prev.rect),
                        Disposal::Previous => {
                            if let Some(saved) = restore_point.take() {
                                canvas = saved;
                            }
                        }
                    }
                    if frame.disposal == Disposal::Previous {
                        restore_point = Some(canvas.clone());
                    }
                }
                paint(&mut canvas, bounds, frame, PaintMode::Over);
            }
            out.push(CompositedFrame {
                image: canvas.clone(),
                delay_cs,
            });
        }
        Ok(out)
    }

    /// Only the first frame, painted onto a fresh canvas.
    pub fn first_frame(&self, anim: &AnimatedImage) -> CompositedFrame {
        let bounds = anim.bounds();
        let mut canvas = RgbaImage::new(bounds.width(), bounds.height());
        let first = &anim.frames()[0];
        paint(&mut canvas, bounds, first, PaintMode::Replace);
        CompositedFrame {
            image: canvas,
            delay_cs: anim.delays_cs()[0],
        }
    }

    /// Decode GIF bytes and composite them.
    pub fn composite_bytes(&self, bytes: &[u8]) -> GiftermResult<Vec<CompositedFrame>> {
        let anim = decode_animation(bytes)?;
        self.composite(&anim)
    }
}

fn paint(canvas: &mut RgbaImage, bounds: Rect, frame: &RawFrame, mode: PaintMode) {
    let width = frame.rect.width();
    let ox = frame.rect.x0 - bounds.x0;
    let oy = frame.rect.y0 - bounds.y0;
    for (i, src) in frame.rgba.chunks_exact(4).enumerate() {
        let i = i as u32;
        let (x, y) = (ox + i64::from(i % width), oy + i64::from(i / width));
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            continue;
        };
        if x >= canvas.width() || y >= canvas.height() {
            continue;
        }
        let src = [src[0], src[1], src[2], src[3]];
        let dst = canvas.get_pixel_mut(x, y);
        dst.0 = match mode {
            PaintMode::Replace => src,
            PaintMode::Over => blend::over(dst.0, src),
        };
    }
}

fn clear(canvas: &mut RgbaImage, bounds: Rect, rect: Rect) {
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            let (Ok(cx), Ok(cy)) = (u32::try_from(x - bounds.x0), u32::try_from(y - bounds.y0))
            else {
                continue;
            };
            if cx < canvas.width() && cy < canvas.height() {
                canvas.get_pixel_mut(cx, cy).0 = [0, 0, 0, 0];
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
