//! The apology animation shown whenever a request cannot be rendered.
//!
//! It is drawn in code so it is always available: a black card on which the letters
//! `O O P S` appear one by one, then flash yellow.

use crate::composite::compositor::Compositor;
use crate::decode::animated::{AnimatedImage, RawFrame};
use crate::foundation::core::RenderedFrame;
use crate::foundation::error::GiftermResult;
use crate::render::adapter::FrameRenderer;

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;
const MARGIN: u32 = 1;
const LETTERS: usize = 4;

const CANVAS_W: u32 = MARGIN * 2 + GLYPH_W * LETTERS as u32 + (LETTERS as u32 - 1);
const CANVAS_H: u32 = MARGIN * 2 + GLYPH_H;

const INK: [u8; 4] = [0xff, 0x5f, 0x87, 0xff];
const FLASH: [u8; 4] = [0xff, 0xd7, 0x00, 0xff];
const PAPER: [u8; 4] = [0x00, 0x00, 0x00, 0xff];

/// Last resort when even the fallback animation cannot be rendered.
pub const PLAIN_APOLOGY: &str = "oops! something went wrong, please try again\n";

#[rustfmt::skip]
const GLYPH_O: [u8; 15] = [
    1, 1, 1,
    1, 0, 1,
    1, 0, 1,
    1, 0, 1,
    1, 1, 1,
];

#[rustfmt::skip]
const GLYPH_P: [u8; 15] = [
    1, 1, 1,
    1, 0, 1,
    1, 1, 1,
    1, 0, 0,
    1, 0, 0,
];

#[rustfmt::skip]
const GLYPH_S: [u8; 15] = [
    1, 1, 1,
    1, 0, 0,
    1, 1, 1,
    0, 0, 1,
    1, 1, 1,
];

const WORD: [&[u8; 15]; LETTERS] = [&GLYPH_O, &GLYPH_O, &GLYPH_P, &GLYPH_S];

fn glyph_left(i: usize) -> u32 {
    MARGIN + i as u32 * (GLYPH_W + 1)
}

/// Glyph pixels; unset cells stay transparent so earlier frames show through.
fn glyph_rgba(glyph: &[u8; 15], ink: [u8; 4]) -> Vec<u8> {
    glyph
        .iter()
        .flat_map(|&on| if on == 1 { ink } else { [0; 4] })
        .collect()
}

/// The apology animation as a decoded image: one background frame, one partial frame per
/// letter, then a full-canvas flash.
pub fn oops_animation() -> GiftermResult<AnimatedImage> {
    let mut frames = Vec::with_capacity(LETTERS + 2);
    let mut delays = Vec::with_capacity(LETTERS + 2);

    frames.push(RawFrame::new(
        0,
        0,
        CANVAS_W,
        CANVAS_H,
        PAPER.repeat((CANVAS_W * CANVAS_H) as usize),
    ));
    delays.push(20);

    for (i, glyph) in WORD.iter().enumerate() {
        frames.push(RawFrame::new(
            glyph_left(i),
            MARGIN,
            GLYPH_W,
            GLYPH_H,
            glyph_rgba(glyph, INK),
        ));
        delays.push(25);
    }

    let mut flash = PAPER.repeat((CANVAS_W * CANVAS_H) as usize);
    for (i, glyph) in WORD.iter().enumerate() {
        for (cell, &on) in glyph.iter().enumerate() {
            if on == 0 {
                continue;
            }
            let x = glyph_left(i) + cell as u32 % GLYPH_W;
            let y = MARGIN + cell as u32 / GLYPH_W;
            let at = ((y * CANVAS_W + x) * 4) as usize;
            flash[at..at + 4].copy_from_slice(&FLASH);
        }
    }
    frames.push(RawFrame::new(0, 0, CANVAS_W, CANVAS_H, flash));
    delays.push(100);

    AnimatedImage::new(frames, delays)
}

/// Render the apology animation with `renderer`.
pub fn render_oops(
    compositor: &Compositor,
    renderer: &FrameRenderer,
) -> GiftermResult<Vec<RenderedFrame>> {
    let composited = compositor.composite(&oops_animation()?)?;
    renderer.render_all(&composited)
}

/// Single-frame text apology. Never fails.
pub fn plain_apology() -> Vec<RenderedFrame> {
    vec![RenderedFrame {
        text: PLAIN_APOLOGY.to_string(),
        delay_cs: 0,
    }]
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/fallback.rs"]
mod tests;
