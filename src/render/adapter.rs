use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::composite::compositor::CompositedFrame;
use crate::config::RenderConfig;
use crate::foundation::core::RenderedFrame;
use crate::foundation::error::{GiftermError, GiftermResult};
use crate::render::ansi::AnsiBlockRenderer;
use crate::render::renderer::{RenderOpts, Renderer};

/// Opaque black.
pub const BACKGROUND: [u8; 4] = [0x00, 0x00, 0x00, 0xff];

/// Applies the terminal rendering policy to composited frames.
///
/// The target grid (`columns x rows` cells) becomes a pixel grid through the renderer's cell size.
/// Frames of one animation render in parallel on a bounded pool and come back in source order.
pub struct FrameRenderer {
    renderer: Arc<dyn Renderer>,
    opts: RenderOpts,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("opts", &self.opts)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl FrameRenderer {
    /// Adapter around an arbitrary renderer.
    pub fn new(renderer: Arc<dyn Renderer>, cfg: &RenderConfig) -> GiftermResult<Self> {
        if cfg.columns == 0 || cfg.rows == 0 {
            return Err(GiftermError::validation(
                "render grid must have at least one column and row",
            ));
        }
        let (cell_w, cell_h) = renderer.cell_size();
        let opts = RenderOpts {
            width_px: cfg.columns.saturating_mul(cell_w),
            height_px: cfg.rows.saturating_mul(cell_h),
            background: BACKGROUND,
            scale: cfg.scale,
        };
        Ok(Self {
            renderer,
            opts,
            pool: build_thread_pool(cfg.threads)?,
        })
    }

    /// Adapter around the built-in [`AnsiBlockRenderer`].
    pub fn ansi(cfg: &RenderConfig) -> GiftermResult<Self> {
        Self::new(Arc::new(AnsiBlockRenderer), cfg)
    }

    /// Policy passed to the renderer for every frame.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Render one frame, keeping its delay.
    pub fn render(&self, frame: &CompositedFrame) -> GiftermResult<RenderedFrame> {
        self.encode(&frame.image, frame.delay_cs)
    }

    /// Render a whole animation. Any failing frame fails the call; order always matches input.
    pub fn render_all(&self, frames: &[CompositedFrame]) -> GiftermResult<Vec<RenderedFrame>> {
        self.pool.install(|| {
            frames
                .par_iter()
                .map(|frame| self.render(frame))
                .collect::<GiftermResult<Vec<_>>>()
        })
    }

    /// Render a still image as a single delay-0 frame.
    pub fn render_still(&self, image: &RgbaImage) -> GiftermResult<RenderedFrame> {
        self.encode(image, 0)
    }

    fn encode(&self, image: &RgbaImage, delay_cs: u32) -> GiftermResult<RenderedFrame> {
        let text = self.renderer.render(image, &self.opts)?;
        RenderedFrame::new(text, delay_cs).map_err(|e| GiftermError::render(e.to_string()))
    }
}

fn build_thread_pool(threads: Option<usize>) -> GiftermResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GiftermError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("gifterm-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GiftermError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/adapter.rs"]
mod tests;
