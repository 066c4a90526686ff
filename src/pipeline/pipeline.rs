use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use url::Url;

use crate::cache::frame_cache::FrameCache;
use crate::cache::fs_store::FsFrameStore;
use crate::cache::store::{FrameStore, MemoryFrameStore};
use crate::composite::compositor::Compositor;
use crate::config::GiftermConfig;
use crate::decode::animated::{decode_animation, decode_still};
use crate::decode::sniff::{Sniffed, sniff};
use crate::foundation::core::{ContentId, RenderedFrame};
use crate::foundation::error::{GiftermError, GiftermResult};
use crate::foundation::math::Rng64;
use crate::pipeline::fallback;
use crate::playback::emitter::{PlaybackMode, TrailingClear};
use crate::render::adapter::FrameRenderer;
use crate::source::fetch::{Fetcher, HttpFetcher, validate_direct_url};
use crate::source::search::{SearchProvider, TenorSearch, normalize_query};
use crate::source::select::select_result;

/// Where the image for a request comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Free-text search terms (underscores read as spaces).
    Search(String),
    /// Direct image URL.
    Url(String),
    /// Raw image bytes already in hand.
    Bytes(Vec<u8>),
}

impl Source {
    fn kind(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::Url(_) => "url",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// One playback request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    pub source: Source,
    /// Play the animation backwards.
    pub reversed: bool,
    /// Show a single still preview instead of the animation.
    pub preview: bool,
}

impl PlayRequest {
    pub fn search(terms: impl Into<String>) -> Self {
        Self::from_source(Source::Search(terms.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::from_source(Source::Url(url.into()))
    }

    pub fn bytes(bytes: Vec<u8>) -> Self {
        Self::from_source(Source::Bytes(bytes))
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    fn from_source(source: Source) -> Self {
        Self {
            source,
            reversed: false,
            preview: false,
        }
    }
}

/// How a [`Playback`] was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Served from the frame cache.
    Cache,
    /// Rendered for this request.
    Fresh,
    /// The apology sequence replaced a failed render.
    Fallback,
}

/// Frames ready for the emitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playback {
    pub frames: Vec<RenderedFrame>,
    pub mode: PlaybackMode,
    pub origin: Origin,
}

impl Playback {
    fn animation(frames: Vec<RenderedFrame>, origin: Origin) -> Self {
        Self {
            frames,
            mode: PlaybackMode::Animation,
            origin,
        }
    }

    fn still(frame: RenderedFrame) -> Self {
        Self {
            frames: vec![frame],
            mode: PlaybackMode::Still,
            origin: Origin::Fresh,
        }
    }

    /// Trailing-clear policy for this playback.
    pub fn trailing(&self) -> TrailingClear {
        self.mode.into()
    }
}

/// Resolve → cache check → render → store, with every hard failure absorbed into the apology
/// animation.
pub struct Pipeline {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn Fetcher>,
    cache: Option<FrameCache>,
    compositor: Compositor,
    renderer: FrameRenderer,
    rng: Mutex<Rng64>,
    fallback: OnceLock<Vec<RenderedFrame>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("cache", &self.cache)
            .field("compositor", &self.compositor)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Builder seeded from `cfg`; collaborators not overridden are built from it.
    pub fn builder(cfg: &GiftermConfig) -> PipelineBuilder {
        PipelineBuilder::new(cfg)
    }

    /// Frame cache, when caching is enabled.
    pub fn cache(&self) -> Option<&FrameCache> {
        self.cache.as_ref()
    }

    /// Produce frames for `req`. Never fails: hard errors yield the apology sequence.
    #[tracing::instrument(skip(self, req), fields(source = req.source.kind(), reversed = req.reversed, preview = req.preview))]
    pub fn run(&self, req: &PlayRequest) -> Playback {
        match self.try_run(req) {
            Ok(playback) => playback,
            Err(e) => {
                tracing::warn!(error = %e, "request failed; playing fallback");
                Playback::animation(self.fallback_frames(), Origin::Fallback)
            }
        }
    }

    /// Like [`Pipeline::run`] but surfaces the error instead of substituting the fallback.
    pub fn try_run(&self, req: &PlayRequest) -> GiftermResult<Playback> {
        match &req.source {
            Source::Search(terms) => self.run_search(terms, req),
            Source::Url(raw) => {
                let url = validate_direct_url(raw)?;
                let bytes = self.fetcher.fetch(&url)?;
                self.run_bytes(&bytes, req)
            }
            Source::Bytes(bytes) => self.run_bytes(bytes, req),
        }
    }

    /// The apology sequence, rendered on first use.
    pub fn fallback_frames(&self) -> Vec<RenderedFrame> {
        self.fallback
            .get_or_init(|| {
                fallback::render_oops(&self.compositor, &self.renderer).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "fallback animation failed to render");
                    fallback::plain_apology()
                })
            })
            .clone()
    }

    fn run_search(&self, terms: &str, req: &PlayRequest) -> GiftermResult<Playback> {
        let query = normalize_query(terms);
        let results = self.search.search(&query)?;
        let idx = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            select_result(&results, &mut rng)
        }
        .ok_or_else(|| GiftermError::search(format!("no results for '{query}'")))?;
        let chosen = &results[idx];
        tracing::debug!(id = %chosen.id, idx, of = results.len(), "selected search result");

        if req.preview {
            let url = parse_result_url(&chosen.preview_url)?;
            let bytes = self.fetcher.fetch(&url)?;
            return self.preview(&bytes);
        }

        let gif_url = parse_result_url(&chosen.gif_url)?;
        self.animated(&ContentId::search(&chosen.id), req.reversed, || {
            let bytes = self.fetcher.fetch(&gif_url)?;
            self.render_animation(&bytes)
        })
    }

    fn run_bytes(&self, bytes: &[u8], req: &PlayRequest) -> GiftermResult<Playback> {
        match sniff(bytes) {
            Sniffed::Gif if req.preview => self.preview(bytes),
            Sniffed::Gif => {
                self.animated(&ContentId::from_bytes(bytes), req.reversed, || {
                    self.render_animation(bytes)
                })
            }
            Sniffed::Still(format) => {
                tracing::debug!(?format, "rendering still image");
                self.still(bytes)
            }
            Sniffed::Unknown => Err(GiftermError::decode("payload is not a recognised image")),
        }
    }

    fn animated<F>(&self, id: &ContentId, reversed: bool, render: F) -> GiftermResult<Playback>
    where
        F: FnOnce() -> GiftermResult<Vec<RenderedFrame>>,
    {
        let Some(cache) = &self.cache else {
            let mut frames = render()?;
            if reversed {
                frames.reverse();
            }
            return Ok(Playback::animation(frames, Origin::Fresh));
        };
        let lookup = cache.get_or_render(id, reversed, render)?;
        let origin = if lookup.is_hit() {
            Origin::Cache
        } else {
            Origin::Fresh
        };
        Ok(Playback::animation(lookup.into_frames(), origin))
    }

    fn render_animation(&self, bytes: &[u8]) -> GiftermResult<Vec<RenderedFrame>> {
        let composited = self.compositor.composite_bytes(bytes)?;
        self.renderer.render_all(&composited)
    }

    /// First frame of a GIF, or the whole of a still image.
    fn preview(&self, bytes: &[u8]) -> GiftermResult<Playback> {
        match sniff(bytes) {
            Sniffed::Gif => {
                let anim = decode_animation(bytes)?;
                let first = self.compositor.first_frame(&anim);
                Ok(Playback::still(self.renderer.render_still(&first.image)?))
            }
            Sniffed::Still(_) => self.still(bytes),
            Sniffed::Unknown => Err(GiftermError::decode("preview is not a recognised image")),
        }
    }

    fn still(&self, bytes: &[u8]) -> GiftermResult<Playback> {
        let image = decode_still(bytes)?;
        Ok(Playback::still(self.renderer.render_still(&image)?))
    }
}

fn parse_result_url(raw: &str) -> GiftermResult<Url> {
    Url::parse(raw).map_err(|e| GiftermError::search(format!("result url '{raw}': {e}")))
}

/// Assembles a [`Pipeline`], defaulting each collaborator from configuration.
pub struct PipelineBuilder {
    cfg: GiftermConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    search: Option<Arc<dyn SearchProvider>>,
    store: Option<Option<Arc<dyn FrameStore>>>,
    renderer: Option<FrameRenderer>,
    seed: Option<u64>,
}

impl PipelineBuilder {
    fn new(cfg: &GiftermConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            fetcher: None,
            search: None,
            store: None,
            renderer: None,
            seed: None,
        }
    }

    /// Network fetcher for images (and for the default search provider).
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Frame store behind the cache; `None` disables caching.
    pub fn store(mut self, store: Option<Arc<dyn FrameStore>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn renderer(mut self, renderer: FrameRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Fixed seed for search-result selection.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> GiftermResult<Pipeline> {
        let cfg = self.cfg;
        cfg.validate()?;

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(f) => f,
            None => Arc::new(HttpFetcher::new(&cfg.fetch)?),
        };
        let search: Arc<dyn SearchProvider> = match self.search {
            Some(s) => s,
            None => Arc::new(TenorSearch::new(&cfg.search, Arc::clone(&fetcher))?),
        };
        let store = match self.store {
            Some(store) => store,
            None => default_store(&cfg)?,
        };
        let renderer = match self.renderer {
            Some(r) => r,
            None => FrameRenderer::ansi(&cfg.render)?,
        };
        let rng = self.seed.map_or_else(Rng64::from_clock, Rng64::new);

        Ok(Pipeline {
            search,
            fetcher,
            cache: store.map(FrameCache::new),
            compositor: Compositor::new(cfg.render.disposal),
            renderer,
            rng: Mutex::new(rng),
            fallback: OnceLock::new(),
        })
    }
}

fn default_store(cfg: &GiftermConfig) -> GiftermResult<Option<Arc<dyn FrameStore>>> {
    if !cfg.cache.enabled {
        return Ok(None);
    }
    let store: Arc<dyn FrameStore> = match &cfg.cache.dir {
        Some(dir) => Arc::new(FsFrameStore::open(dir.clone())?),
        None => Arc::new(MemoryFrameStore::new()),
    };
    Ok(Some(store))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/pipeline.rs"]
mod tests;
