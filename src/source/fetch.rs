use std::io::Read as _;
use std::time::Duration;

use url::Url;

use crate::config::FetchConfig;
use crate::foundation::error::{GiftermError, GiftermResult};

/// Path extensions accepted for direct image URLs.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Blocking byte fetcher for remote images.
pub trait Fetcher: Send + Sync {
    /// Download the body at `url`.
    fn fetch(&self, url: &Url) -> GiftermResult<Vec<u8>>;
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Client with the configured timeout and body cap.
    pub fn new(cfg: &FetchConfig) -> GiftermResult<Self> {
        Self::with_limits(cfg.timeout(), cfg.max_bytes)
    }

    pub fn with_limits(timeout: Duration, max_bytes: u64) -> GiftermResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("gifterm/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GiftermError::fetch(format!("failed to build http client: {e}")))?;
        Ok(Self { client, max_bytes })
    }
}

impl Fetcher for HttpFetcher {
    #[tracing::instrument(skip(self), fields(url = %url))]
    fn fetch(&self, url: &Url) -> GiftermResult<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| GiftermError::fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GiftermError::fetch(format!("{url} returned HTTP {status}")));
        }
        if let Some(len) = response.content_length()
            && len > self.max_bytes
        {
            return Err(GiftermError::fetch(format!(
                "{url} body is {len} bytes, limit is {}",
                self.max_bytes
            )));
        }

        // Content-Length may be absent or wrong; cap the read itself.
        let mut body = Vec::new();
        response
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| GiftermError::fetch(format!("reading {url}: {e}")))?;
        if body.len() as u64 > self.max_bytes {
            return Err(GiftermError::fetch(format!(
                "{url} body exceeds {} bytes",
                self.max_bytes
            )));
        }
        tracing::debug!(bytes = body.len(), "fetched");
        Ok(body)
    }
}

/// Parse and vet a user-supplied image URL before any network traffic.
///
/// The URL needs a scheme, a host and a path extension from [`ALLOWED_EXTENSIONS`]
/// (compared case-insensitively).
pub fn validate_direct_url(raw: &str) -> GiftermResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| GiftermError::validation(format!("malformed url '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GiftermError::validation(format!(
            "unsupported url scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(GiftermError::validation(format!("url '{raw}' has no host")));
    }

    let ext = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(url),
        Some(ext) => Err(GiftermError::validation(format!(
            "unsupported image extension '.{ext}'"
        ))),
        None => Err(GiftermError::validation(format!(
            "url '{raw}' has no image extension"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/fetch.rs"]
mod tests;
