use std::fmt;

use crate::foundation::error::{GiftermError, GiftermResult};

/// Clears the whole terminal.
pub const CLEAR_SCREEN: &str = "\x1b[2J";
/// Moves the cursor to row 1, column 1.
pub const CURSOR_HOME: &str = "\x1b[1;1H";

const CURSOR_HOME_SHORT: &str = "\x1b[H";

/// Stable cache key identifying one source animation.
///
/// Ids are namespaced so that a search-provider id can never collide with a content digest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Id for a search result, keyed by the provider's own result id.
    pub fn search(result_id: &str) -> Self {
        Self(format!("search:{result_id}"))
    }

    /// Id derived from the raw image bytes (128-bit xxh3 digest).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = xxhash_rust::xxh3::xxh3_128(bytes);
        Self(format!("blob:{digest:032x}"))
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One terminal-printable frame and how long to wait before showing it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderedFrame {
    /// Printable text (SGR colour sequences only, no cursor movement).
    pub text: String,
    /// Display delay in hundredths of a second.
    pub delay_cs: u32,
}

impl RenderedFrame {
    /// Build a frame, rejecting text that embeds cursor-reset sequences.
    ///
    /// Those sequences belong to playback, never to the cached representation.
    pub fn new(text: impl Into<String>, delay_cs: u32) -> GiftermResult<Self> {
        let text = text.into();
        if [CLEAR_SCREEN, CURSOR_HOME, CURSOR_HOME_SHORT]
            .iter()
            .any(|seq| text.contains(seq))
        {
            return Err(GiftermError::validation(
                "rendered frame text must not contain cursor-reset sequences",
            ));
        }
        Ok(Self { text, delay_cs })
    }

    /// Playback delay as a duration (`delay_cs * 10` ms).
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.delay_cs) * 10)
    }
}

/// Axis-aligned integer rectangle, max edges exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x0: i64,
    /// Top edge.
    pub y0: i64,
    /// Right edge (exclusive).
    pub x1: i64,
    /// Bottom edge (exclusive).
    pub y1: i64,
}

impl Rect {
    /// Rectangle at `(x, y)` with the given size.
    pub fn from_origin_size(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + i64::from(width),
            y1: y + i64::from(height),
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Width in pixels (zero for inverted rectangles).
    pub fn width(self) -> u32 {
        u32::try_from((self.x1 - self.x0).max(0)).unwrap_or(u32::MAX)
    }

    /// Height in pixels (zero for inverted rectangles).
    pub fn height(self) -> u32 {
        u32::try_from((self.y1 - self.y0).max(0)).unwrap_or(u32::MAX)
    }

    /// `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
