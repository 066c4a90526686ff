#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use gifterm::{
    Fetcher, GiftermError, GiftermResult, SearchProvider, SearchResult,
};
use url::Url;

/// Serves canned bodies by exact URL and records every request.
#[derive(Default)]
pub struct MapFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for MapFetcher {
    fn fetch(&self, url: &Url) -> GiftermResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| GiftermError::fetch(format!("HTTP 404 for {url}")))
    }
}

/// Always fails as if the upstream host were unreachable.
pub struct DownFetcher;

impl Fetcher for DownFetcher {
    fn fetch(&self, url: &Url) -> GiftermResult<Vec<u8>> {
        Err(GiftermError::fetch(format!("connection refused: {url}")))
    }
}

/// Returns the same results for every query.
pub struct FixedSearch(pub Vec<SearchResult>);

impl SearchProvider for FixedSearch {
    fn search(&self, _: &str) -> GiftermResult<Vec<SearchResult>> {
        Ok(self.0.clone())
    }
}

/// Fails every query.
pub struct BrokenSearch;

impl SearchProvider for BrokenSearch {
    fn search(&self, _: &str) -> GiftermResult<Vec<SearchResult>> {
        Err(GiftermError::search("upstream returned HTTP 500"))
    }
}

pub fn result(id: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        gif_url: format!("https://media.test/{id}.gif"),
        preview_url: format!("https://media.test/{id}.png"),
    }
}

pub fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "gifterm_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Route `tracing` output through the test harness so it shows up on failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
