use image::RgbaImage;

use crate::config::ScaleMode;
use crate::foundation::error::GiftermResult;

/// Pixel-grid policy handed to a [`Renderer`] for every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOpts {
    /// Target width in source pixels before text encoding.
    pub width_px: u32,
    /// Target height in source pixels before text encoding.
    pub height_px: u32,
    /// Opaque colour that transparent pixels and letterbox bars are filled with.
    pub background: [u8; 4],
    /// How the image is scaled into `width_px x height_px`.
    pub scale: ScaleMode,
}

/// Raster-to-text capability.
///
/// Implementations own colour mapping and glyph choice. The output must be printable as-is and
/// must not move the cursor; playback adds positioning.
pub trait Renderer: Send + Sync {
    /// Pixels covered by one terminal cell, as `(width, height)`.
    fn cell_size(&self) -> (u32, u32);

    /// Encode one straight-alpha RGBA8 image.
    fn render(&self, image: &RgbaImage, opts: &RenderOpts) -> GiftermResult<String>;
}
