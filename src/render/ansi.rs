use std::fmt::Write as _;

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::composite::blend::flatten;
use crate::config::ScaleMode;
use crate::foundation::error::{GiftermError, GiftermResult};
use crate::render::renderer::{RenderOpts, Renderer};

const LOWER_HALF_BLOCK: char = '\u{2584}';
const SGR_RESET: &str = "\x1b[0m";

/// Truecolor half-block renderer.
///
/// Every text cell shows two vertically stacked pixels: the upper one as background colour and
/// the lower one as the foreground of a `▄` glyph. No dithering.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiBlockRenderer;

impl AnsiBlockRenderer {
    /// Horizontal pixels per grid cell.
    pub const CELL_WIDTH: u32 = 4;
    /// Vertical pixels per grid cell.
    pub const CELL_HEIGHT: u32 = 8;
}

impl Renderer for AnsiBlockRenderer {
    fn cell_size(&self) -> (u32, u32) {
        (Self::CELL_WIDTH, Self::CELL_HEIGHT)
    }

    fn render(&self, image: &RgbaImage, opts: &RenderOpts) -> GiftermResult<String> {
        if opts.width_px == 0 || opts.height_px == 0 {
            return Err(GiftermError::render("target pixel grid must be non-empty"));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(GiftermError::render("source image has zero area"));
        }
        let scaled = scale(image, opts);
        encode_half_blocks(&scaled, opts.background)
    }
}

fn scale(image: &RgbaImage, opts: &RenderOpts) -> RgbaImage {
    let mut flat = image.clone();
    for px in flat.pixels_mut() {
        px.0 = flatten(px.0, opts.background);
    }
    let (w, h) = (opts.width_px, opts.height_px);
    let src = DynamicImage::ImageRgba8(flat);
    match opts.scale {
        ScaleMode::Resize => src.resize_exact(w, h, FilterType::Lanczos3).to_rgba8(),
        ScaleMode::Fill => src.resize_to_fill(w, h, FilterType::Lanczos3).to_rgba8(),
        ScaleMode::Fit => {
            let fitted = src.resize(w, h, FilterType::Lanczos3).to_rgba8();
            let mut canvas = RgbaImage::from_pixel(w, h, image::Rgba(opts.background));
            let x = i64::from((w - fitted.width().min(w)) / 2);
            let y = i64::from((h - fitted.height().min(h)) / 2);
            image::imageops::replace(&mut canvas, &fitted, x, y);
            canvas
        }
    }
}

fn encode_half_blocks(img: &RgbaImage, background: [u8; 4]) -> GiftermResult<String> {
    let (w, h) = img.dimensions();
    // Roughly 40 bytes of SGR per cell.
    let mut out = String::with_capacity((w as usize) * (h as usize / 2 + 1) * 40);
    for y in (0..h).step_by(2) {
        for x in 0..w {
            let upper = img.get_pixel(x, y).0;
            let lower = if y + 1 < h {
                img.get_pixel(x, y + 1).0
            } else {
                background
            };
            write!(
                out,
                "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{LOWER_HALF_BLOCK}",
                upper[0], upper[1], upper[2], lower[0], lower[1], lower[2]
            )
            .map_err(|e| GiftermError::render(format!("format cell: {e}")))?;
        }
        out.push_str(SGR_RESET);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/ansi.rs"]
mod tests;
