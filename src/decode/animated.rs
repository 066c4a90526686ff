use std::io::Cursor;

use crate::foundation::core::Rect;
use crate::foundation::error::{GiftermError, GiftermResult};

/// Largest canvas area, in pixels, an animation may composite to.
pub const MAX_CANVAS_PIXELS: u64 = 2048 * 2048;

/// What to do with a frame's area before the next frame is painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disposal {
    /// Leave the canvas as painted (also used for "unspecified").
    #[default]
    Keep,
    /// Clear the frame's rectangle to transparent.
    Background,
    /// Restore the canvas to its state before the frame was painted.
    Previous,
}

/// One undecorated frame as stored in the source: a placement rectangle plus straight RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Placement on the logical canvas.
    pub rect: Rect,
    /// Row-major straight-alpha RGBA8, `rect.width() * rect.height() * 4` bytes.
    pub rgba: Vec<u8>,
    /// Disposal directive applied after this frame is shown.
    pub disposal: Disposal,
}

impl RawFrame {
    /// Frame placed at `(left, top)`.
    pub fn new(left: u32, top: u32, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            rect: Rect::from_origin_size(i64::from(left), i64::from(top), width, height),
            rgba,
            disposal: Disposal::Keep,
        }
    }

    /// Builder-style disposal override.
    pub fn with_disposal(mut self, disposal: Disposal) -> Self {
        self.disposal = disposal;
        self
    }
}

/// A decoded animation: frames, a parallel list of delays, and the canvas bounds.
///
/// Immutable once built; the compositor consumes it by reference and it is dropped afterwards.
#[derive(Clone, Debug)]
pub struct AnimatedImage {
    frames: Vec<RawFrame>,
    delays_cs: Vec<u32>,
    bounds: Rect,
}

impl AnimatedImage {
    /// Validate frames against delays and compute the canvas bounds.
    ///
    /// Bounds are the smallest rectangle containing every placement rectangle; canvases larger
    /// than [`MAX_CANVAS_PIXELS`] are rejected.
    pub fn new(frames: Vec<RawFrame>, delays_cs: Vec<u32>) -> GiftermResult<Self> {
        if frames.is_empty() {
            return Err(GiftermError::EmptySequence);
        }
        if frames.len() != delays_cs.len() {
            return Err(GiftermError::validation(format!(
                "animation has {} frames but {} delays",
                frames.len(),
                delays_cs.len()
            )));
        }
        let mut bounds = frames[0].rect;
        for (idx, frame) in frames.iter().enumerate() {
            let expected = (frame.rect.width() as usize)
                .checked_mul(frame.rect.height() as usize)
                .and_then(|px| px.checked_mul(4))
                .ok_or_else(|| GiftermError::decode("frame size overflow"))?;
            if frame.rgba.len() != expected {
                return Err(GiftermError::decode(format!(
                    "frame {idx} has {} pixel bytes, expected {expected}",
                    frame.rgba.len()
                )));
            }
            bounds = bounds.union(frame.rect);
        }
        if bounds.is_empty() {
            return Err(GiftermError::decode("animation canvas has zero area"));
        }
        let area = u64::from(bounds.width()) * u64::from(bounds.height());
        if area > MAX_CANVAS_PIXELS {
            return Err(GiftermError::decode(format!(
                "animation canvas {}x{} exceeds {MAX_CANVAS_PIXELS} pixels",
                bounds.width(),
                bounds.height()
            )));
        }
        Ok(Self {
            frames,
            delays_cs,
            bounds,
        })
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    /// Per-frame delays in hundredths of a second, parallel to [`Self::frames`].
    pub fn delays_cs(&self) -> &[u32] {
        &self.delays_cs
    }

    /// Canvas rectangle containing every frame.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of frames (always at least one).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; construction rejects empty animations.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decode GIF bytes into raw frames, keeping offsets and disposal directives.
pub fn decode_animation(bytes: &[u8]) -> GiftermResult<AnimatedImage> {
    let mut opts = ::gif::DecodeOptions::new();
    opts.set_color_output(::gif::ColorOutput::RGBA);
    let mut decoder = opts
        .read_info(Cursor::new(bytes))
        .map_err(|e| GiftermError::decode(format!("read gif header: {e}")))?;

    let mut frames = Vec::new();
    let mut delays_cs = Vec::new();
    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| GiftermError::decode(format!("read gif frame {}: {e}", frames.len())))?
    {
        let disposal = match frame.dispose {
            ::gif::DisposalMethod::Background => Disposal::Background,
            ::gif::DisposalMethod::Previous => Disposal::Previous,
            ::gif::DisposalMethod::Any | ::gif::DisposalMethod::Keep => Disposal::Keep,
        };
        frames.push(
            RawFrame::new(
                u32::from(frame.left),
                u32::from(frame.top),
                u32::from(frame.width),
                u32::from(frame.height),
                frame.buffer.to_vec(),
            )
            .with_disposal(disposal),
        );
        delays_cs.push(u32::from(frame.delay));
    }

    AnimatedImage::new(frames, delays_cs)
}

/// Decode any still image format supported by `image` to straight RGBA8.
pub fn decode_still(bytes: &[u8]) -> GiftermResult<image::RgbaImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| GiftermError::decode(format!("decode still image: {e}")))?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/decode/animated.rs"]
mod tests;
