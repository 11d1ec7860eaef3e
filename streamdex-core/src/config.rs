use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Tunables shared by every component of the fetch/cache pipeline.
///
/// The server builds this from the environment; tests construct it directly
/// and override only the fields they care about.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the upstream API, without a trailing slash.
    pub tmdb_base_url: String,
    /// Bearer token sent when the caller does not supply an API key override.
    pub tmdb_bearer_token: Option<String>,
    /// Language used when a request does not carry its own.
    pub language: String,
    /// Watch regions fanned out by the discover orchestrator, in order.
    pub watch_regions: Vec<String>,
    /// Upper bound of upstream calls in flight, process wide.
    pub dispatcher_concurrency: usize,
    /// Number of titles enriched per batch.
    pub batch_size: usize,
    /// Lifetime of catalog responses in the response cache.
    pub catalog_ttl_days: u32,
    /// Lifetime of downloaded posters on disk.
    pub poster_ttl_days: u32,
    /// Retry the video list without a language filter when no localized
    /// trailer exists.
    pub trailer_fallback_without_language: bool,
    /// Directory holding cached poster files.
    pub poster_dir: PathBuf,
    /// Public base URL used to build links to cached posters.
    pub public_base_url: String,
    /// Timeout applied by the HTTP transport to each upstream call.
    pub http_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            tmdb_bearer_token: None,
            language: DEFAULT_LANGUAGE.to_string(),
            watch_regions: Vec::new(),
            dispatcher_concurrency: 45,
            batch_size: 20,
            catalog_ttl_days: 3,
            poster_ttl_days: 3,
            trailer_fallback_without_language: false,
            poster_dir: PathBuf::from("db/posters"),
            public_base_url: "http://localhost:7000".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl CatalogConfig {
    pub fn catalog_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.catalog_ttl_days))
    }

    pub fn poster_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.poster_ttl_days) * 24 * 60 * 60)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Parse a comma separated region list, dropping blanks.
    pub fn parse_regions(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .map(str::to_string)
            .collect()
    }
}
