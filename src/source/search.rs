use std::sync::Arc;

use url::Url;

use crate::config::SearchConfig;
use crate::foundation::error::{GiftermError, GiftermResult};
use crate::source::fetch::Fetcher;

/// One candidate animation returned by a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Provider-assigned id; the cache key for this animation.
    pub id: String,
    /// Full animated GIF.
    pub gif_url: String,
    /// Still preview image.
    pub preview_url: String,
}

/// Maps a text query to an ordered list of candidate animations.
pub trait SearchProvider: Send + Sync {
    fn search(&self, query: &str) -> GiftermResult<Vec<SearchResult>>;
}

/// Search terms arrive `snake_cased` from paths; the provider wants spaces.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().replace('_', " ")
}

/// Tenor v1 search endpoint.
pub struct TenorSearch {
    endpoint: Url,
    api_key: String,
    limit: u32,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for TenorSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenorSearch")
            .field("endpoint", &self.endpoint.as_str())
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl TenorSearch {
    pub fn new(cfg: &SearchConfig, fetcher: Arc<dyn Fetcher>) -> GiftermResult<Self> {
        let base = cfg.api_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/v1/search")).map_err(|e| {
            GiftermError::validation(format!("invalid search.api_url '{}': {e}", cfg.api_url))
        })?;
        Ok(Self {
            endpoint,
            api_key: cfg.api_key.clone(),
            limit: cfg.limit,
            fetcher,
        })
    }

    /// Full request URL for `query`.
    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("key", &self.api_key)
            .append_pair("media_filter", "minimal")
            .append_pair("limit", &self.limit.to_string());
        url
    }
}

impl SearchProvider for TenorSearch {
    #[tracing::instrument(skip(self))]
    fn search(&self, query: &str) -> GiftermResult<Vec<SearchResult>> {
        let body = self
            .fetcher
            .fetch(&self.request_url(query))
            .map_err(|e| GiftermError::search(e.to_string()))?;
        let results = parse_tenor_response(&body)?;
        tracing::debug!(results = results.len(), "search complete");
        Ok(results)
    }
}

#[derive(serde::Deserialize)]
struct TenorResponse {
    #[serde(default)]
    results: Vec<TenorResult>,
}

#[derive(serde::Deserialize)]
struct TenorResult {
    id: String,
    #[serde(default)]
    media: Vec<TenorMedia>,
}

#[derive(serde::Deserialize)]
struct TenorMedia {
    gif: Option<TenorGif>,
}

#[derive(serde::Deserialize)]
struct TenorGif {
    url: String,
    #[serde(default)]
    preview: String,
}

/// Decode a Tenor v1 search payload. Results without GIF media are skipped.
pub(crate) fn parse_tenor_response(body: &[u8]) -> GiftermResult<Vec<SearchResult>> {
    let parsed: TenorResponse = serde_json::from_slice(body)
        .map_err(|e| GiftermError::search(format!("malformed search response: {e}")))?;
    Ok(parsed
        .results
        .into_iter()
        .filter_map(|r| {
            let gif = r.media.into_iter().next()?.gif?;
            Some(SearchResult {
                id: r.id,
                gif_url: gif.url,
                preview_url: gif.preview,
            })
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/source/search.rs"]
mod tests;
