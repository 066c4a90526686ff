use crate::foundation::core::ContentId;

/// Convenience result type used across gifterm.
pub type GiftermResult<T> = Result<T, GiftermError>;

/// Top-level error taxonomy used by the rendering service.
///
/// Only [`GiftermError::AdmissionRejected`] is meant to reach a client as a distinguishable
/// outcome. The pipeline absorbs every hard error into its fallback animation and demotes
/// [`GiftermError::Store`] to a logged warning.
#[derive(thiserror::Error, Debug)]
pub enum GiftermError {
    /// The client exhausted its token bucket.
    #[error("admission rejected: rate limit exceeded")]
    AdmissionRejected,

    /// The search provider failed or returned an unusable payload.
    #[error("search error: {0}")]
    Search(String),

    /// A network fetch failed (transport error, non-success status, oversized body).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Invalid user-provided input (malformed URL, unsupported extension, bad config).
    #[error("validation error: {0}")]
    Validation(String),

    /// The bytes are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The animation decoded to zero frames.
    #[error("empty sequence: animation has no frames")]
    EmptySequence,

    /// Converting a raster frame to terminal text failed.
    #[error("render error: {0}")]
    Render(String),

    /// The frame store rejected a read or write.
    #[error("store error: {0}")]
    Store(String),

    /// No frame sequence is cached for the id.
    #[error("not found in cache: {0}")]
    NotFound(ContentId),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GiftermError {
    /// Build a [`GiftermError::Search`] value.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Build a [`GiftermError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`GiftermError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GiftermError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GiftermError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GiftermError::Store`] value.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Soft errors never replace a response with the fallback animation.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::AdmissionRejected | Self::Store(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
