//! Service configuration.
//!
//! Every field has a default, so `{}` is a valid configuration document. Values are loaded from
//! JSON and may then be overridden by CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{GiftermError, GiftermResult};

/// Root configuration document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GiftermConfig {
    /// Search provider settings.
    pub search: SearchConfig,
    /// Per-client admission control.
    pub admission: AdmissionConfig,
    /// Terminal rendering policy.
    pub render: RenderConfig,
    /// Network fetch limits.
    pub fetch: FetchConfig,
    /// Rendered-frame cache.
    pub cache: CacheConfig,
}

/// Search provider settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Base URL of the search API.
    pub api_url: String,
    /// API key sent with every search.
    pub api_key: String,
    /// Maximum number of results requested per search.
    pub limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: "https://g.tenor.com".to_string(),
            api_key: String::new(),
            limit: 10,
        }
    }
}

/// Token-bucket limits and janitor cadence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdmissionConfig {
    /// Refill rate in tokens per second.
    pub rate_per_sec: f64,
    /// Bucket capacity.
    pub burst: u32,
    /// Seconds between janitor sweeps.
    pub sweep_interval_secs: u64,
    /// Seconds a client may stay idle before its bucket is evicted.
    pub idle_secs: u64,
}

impl AdmissionConfig {
    pub(crate) fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub(crate) fn idle_after(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            rate_per_sec: 1.0,
            burst: 3,
            sweep_interval_secs: 60,
            idle_secs: 180,
        }
    }
}

/// How the compositor treats a frame's GIF disposal directive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisposalPolicy {
    /// Always paint over the persistent canvas and never restore it.
    #[default]
    Overpaint,
    /// Apply restore-to-background / restore-to-previous before the next frame.
    Honor,
}

/// How a frame is scaled into the target pixel grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Stretch to the exact grid, ignoring aspect ratio.
    Resize,
    /// Preserve aspect ratio and crop to cover the grid.
    Fill,
    /// Preserve aspect ratio and letterbox inside the grid.
    #[default]
    Fit,
}

/// Terminal rendering policy.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Target grid width in renderer cells.
    pub columns: u32,
    /// Target grid height in renderer cells.
    pub rows: u32,
    /// Worker threads for per-frame rendering (`None` = rayon default).
    pub threads: Option<usize>,
    /// Compositing disposal policy.
    pub disposal: DisposalPolicy,
    /// Down-scaling mode.
    pub scale: ScaleMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            columns: 30,
            rows: 9,
            threads: None,
            disposal: DisposalPolicy::Overpaint,
            scale: ScaleMode::Fit,
        }
    }
}

/// Network fetch limits.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Largest accepted response body.
    pub max_bytes: u64,
}

impl FetchConfig {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Rendered-frame cache.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Disable to render every request from scratch.
    pub enabled: bool,
    /// Directory for the on-disk store; in-memory when unset.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

impl GiftermConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(s: &str) -> GiftermResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse configuration JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_path(path: &Path) -> GiftermResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read configuration '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Reject values that would stall or divide by zero at runtime.
    pub fn validate(&self) -> GiftermResult<()> {
        if self.search.limit == 0 {
            return Err(GiftermError::validation("search.limit must be >= 1"));
        }
        if !self.admission.rate_per_sec.is_finite() || self.admission.rate_per_sec <= 0.0 {
            return Err(GiftermError::validation(
                "admission.rate_per_sec must be finite and > 0",
            ));
        }
        if self.admission.burst == 0 {
            return Err(GiftermError::validation("admission.burst must be >= 1"));
        }
        if self.admission.sweep_interval_secs == 0 {
            return Err(GiftermError::validation(
                "admission.sweep_interval_secs must be >= 1",
            ));
        }
        if self.render.columns == 0 || self.render.rows == 0 {
            return Err(GiftermError::validation(
                "render.columns and render.rows must be >= 1",
            ));
        }
        if let Some(n) = self.render.threads
            && n == 0
        {
            return Err(GiftermError::validation(
                "render.threads must be >= 1 when set",
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(GiftermError::validation("fetch.timeout_secs must be >= 1"));
        }
        if self.fetch.max_bytes == 0 {
            return Err(GiftermError::validation("fetch.max_bytes must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
