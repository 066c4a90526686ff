use std::io::Write;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{CLEAR_SCREEN, CURSOR_HOME, RenderedFrame};
use crate::foundation::error::GiftermResult;

/// What kind of sequence is being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Timed animation (including the apology sequence).
    Animation,
    /// A single still image or preview.
    Still,
}

/// Whether the screen is cleared after the last frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrailingClear {
    /// Clear the screen once playback ends.
    Clear,
    /// Leave the last frame on screen.
    Keep,
}

impl From<PlaybackMode> for TrailingClear {
    fn from(mode: PlaybackMode) -> Self {
        match mode {
            PlaybackMode::Animation => Self::Clear,
            PlaybackMode::Still => Self::Keep,
        }
    }
}

/// Stream `frames` to `sink`, sleeping for each frame's delay.
pub fn emit<W: Write + ?Sized>(
    frames: &[RenderedFrame],
    sink: &mut W,
    trailing: TrailingClear,
) -> GiftermResult<()> {
    emit_with(frames, sink, trailing, std::thread::sleep)
}

/// [`emit`] with an injectable pacer.
///
/// Output is `ESC[2J ESC[1;1H`, then per frame: pace, text, `ESC[1;1H`, flush. A trailing
/// `ESC[2J` follows when `trailing` is [`TrailingClear::Clear`]; with [`TrailingClear::Keep`] the
/// last frame gets no cursor reset, so the cursor stays below the image. Blocks for the sum of
/// all delays; the sink is owned by this call for the whole sequence.
pub fn emit_with<W, P>(
    frames: &[RenderedFrame],
    sink: &mut W,
    trailing: TrailingClear,
    mut pace: P,
) -> GiftermResult<()>
where
    W: Write + ?Sized,
    P: FnMut(Duration),
{
    sink.write_all([CLEAR_SCREEN, CURSOR_HOME].concat().as_bytes())
        .context("write playback preamble")?;
    sink.flush().context("flush playback preamble")?;

    let last = frames.len().saturating_sub(1);
    for (idx, frame) in frames.iter().enumerate() {
        let delay = frame.delay();
        if !delay.is_zero() {
            pace(delay);
        }
        sink.write_all(frame.text.as_bytes())
            .with_context(|| format!("write frame {idx}"))?;
        if idx != last || trailing == TrailingClear::Clear {
            sink.write_all(CURSOR_HOME.as_bytes())
                .with_context(|| format!("write cursor reset after frame {idx}"))?;
        }
        sink.flush().with_context(|| format!("flush frame {idx}"))?;
    }

    if trailing == TrailingClear::Clear {
        sink.write_all(CLEAR_SCREEN.as_bytes())
            .context("write trailing clear")?;
        sink.flush().context("flush trailing clear")?;
    }
    tracing::debug!(frames = frames.len(), ?trailing, "playback finished");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/emitter.rs"]
mod tests;
