use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_REQUEST_URL: &str = "https://wpcampus.org/wp-json/wpcampus/tweets";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
/// Ceiling on automatic refresh cycles; resettable by external signal.
pub const DEFAULT_ATTEMPT_LIMIT: u32 = 10;

/// Widget configuration, usually loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetsConfig {
    #[serde(default = "default_request_url")]
    pub request_url: String,
    /// Per-request item count (`per_page`). Absent means the endpoint's
    /// default; also bounds how many posts render.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Maximum automatic refresh cycles. Unset or zero falls back to
    /// [`DEFAULT_ATTEMPT_LIMIT`].
    #[serde(default)]
    pub attempt_limit: Option<u32>,
}

fn default_request_url() -> String {
    DEFAULT_REQUEST_URL.to_string()
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

impl Default for TweetsConfig {
    fn default() -> Self {
        Self {
            request_url: default_request_url(),
            limit: None,
            refresh_interval_secs: default_refresh_interval(),
            attempt_limit: None,
        }
    }
}

impl TweetsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("could not parse config file {}", path.display()))
    }

    /// Effective attempt ceiling: configured positive value or the default.
    pub fn effective_attempt_limit(&self) -> u32 {
        match self.attempt_limit {
            Some(n) if n > 0 => n,
            _ => DEFAULT_ATTEMPT_LIMIT,
        }
    }
}
