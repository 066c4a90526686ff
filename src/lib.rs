//! gifterm renders animated GIFs and still images as timed sequences of truecolor terminal frames.
//!
//! A request flows through three stages:
//!
//! 1. **Admission**: a per-client token bucket ([`AdmissionController`]) with a background janitor
//!    that evicts idle clients.
//! 2. **Pipeline**: resolve the image (search, direct URL or raw bytes), consult the
//!    [`FrameCache`], and on a miss decode, composite ([`Compositor`]) and render
//!    ([`FrameRenderer`]) every frame before storing the result. Hard failures are absorbed into a
//!    built-in apology animation, so an admitted request always gets frames.
//! 3. **Playback**: [`emit`] streams the frames to a sink, pacing each by its own delay.
//!
//! [`Service`] ties the three together.
#![forbid(unsafe_code)]

mod admission;
mod cache;
mod composite;
mod config;
mod decode;
mod foundation;
mod pipeline;
mod playback;
mod render;
mod service;
mod source;

pub use crate::admission::limiter::AdmissionController;
pub use crate::cache::frame_cache::{FrameCache, Lookup};
pub use crate::cache::fs_store::FsFrameStore;
pub use crate::cache::store::{FrameOrder, FrameStore, MemoryFrameStore, PutOutcome};
pub use crate::composite::blend::{Rgba8, over};
pub use crate::composite::compositor::{CompositedFrame, Compositor};
pub use crate::config::{
    AdmissionConfig, CacheConfig, DisposalPolicy, FetchConfig, GiftermConfig, RenderConfig,
    ScaleMode, SearchConfig,
};
pub use crate::decode::animated::{
    AnimatedImage, Disposal, RawFrame, decode_animation, decode_still,
};
pub use crate::decode::sniff::{Sniffed, sniff};
pub use crate::foundation::core::{CLEAR_SCREEN, CURSOR_HOME, ContentId, Rect, RenderedFrame};
pub use crate::foundation::error::{GiftermError, GiftermResult};
pub use crate::foundation::math::Rng64;
pub use crate::pipeline::fallback::{PLAIN_APOLOGY, oops_animation};
pub use crate::pipeline::pipeline::{
    Origin, PipelineBuilder, PlayRequest, Playback, Pipeline, Source,
};
pub use crate::playback::emitter::{PlaybackMode, TrailingClear, emit, emit_with};
pub use crate::render::adapter::{BACKGROUND, FrameRenderer};
pub use crate::render::ansi::AnsiBlockRenderer;
pub use crate::render::renderer::{RenderOpts, Renderer};
pub use crate::service::Service;
pub use crate::source::fetch::{ALLOWED_EXTENSIONS, Fetcher, HttpFetcher, validate_direct_url};
pub use crate::source::search::{SearchProvider, SearchResult, TenorSearch, normalize_query};
pub use crate::source::select::select_result;
