use std::{env, path::PathBuf, str::FromStr, time::Duration};

use serde::Deserialize;
use streamdex_core::CatalogConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://db/streamdex.db";

/// Server configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings
    pub database_url: String,

    /// Hours between two sweeps of expired response cache rows.
    pub cache_sweep_interval_hours: u64,

    /// Pipeline tunables handed to `streamdex-core`.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Build from any key/value source; unparsable values fall back to the
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CatalogConfig::default();

        let catalog = CatalogConfig {
            tmdb_base_url: lookup("TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url),
            tmdb_bearer_token: lookup("TMDB_BEARER_TOKEN").filter(|token| !token.is_empty()),
            language: lookup("TMDB_LANGUAGE")
                .filter(|lang| !lang.is_empty())
                .unwrap_or(defaults.language),
            watch_regions: lookup("TMDB_WATCH_REGION")
                .map(|raw| CatalogConfig::parse_regions(&raw))
                .unwrap_or_default(),
            dispatcher_concurrency: parse_var(&lookup, "DISPATCHER_CONCURRENCY")
                .unwrap_or(defaults.dispatcher_concurrency),
            batch_size: parse_var(&lookup, "ENRICH_BATCH_SIZE").unwrap_or(defaults.batch_size),
            catalog_ttl_days: parse_var(&lookup, "CACHE_CATALOG_CONTENT_DURATION_DAYS")
                .unwrap_or(defaults.catalog_ttl_days),
            poster_ttl_days: parse_var(&lookup, "CACHE_POSTER_CONTENT_DURATION_DAYS")
                .unwrap_or(defaults.poster_ttl_days),
            trailer_fallback_without_language: lookup(
                "TMDB_FETCH_TRAILER_WITHOUT_LANGUAGE_FALLBACK",
            )
            .map(|raw| parse_flag(&raw))
            .unwrap_or(defaults.trailer_fallback_without_language),
            poster_dir: lookup("POSTER_DIR").map(PathBuf::from).unwrap_or(defaults.poster_dir),
            public_base_url: lookup("BASE_URL").unwrap_or(defaults.public_base_url),
            http_timeout_secs: parse_var(&lookup, "TMDB_HTTP_TIMEOUT_SECS")
                .unwrap_or(defaults.http_timeout_secs),
        };

        Self {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(7000),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            cache_sweep_interval_hours: parse_var(&lookup, "CACHE_SWEEP_INTERVAL_HOURS").unwrap_or(24),
            catalog,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_hours.max(1) * 60 * 60)
    }

    /// Filesystem path of a `sqlite:` database URL, `None` for in-memory
    /// databases.
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|raw| raw.trim().parse().ok())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
