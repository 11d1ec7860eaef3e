//! Records shared between the caches, the enricher and the route layer.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Separator used for the denormalized name lists stored in the metadata
/// table.
///
/// Names are joined verbatim: a name that itself contains a comma does not
/// survive a round trip and comes back as two entries.
pub const LIST_DELIMITER: &str = ",";

pub fn join_names(names: &[String]) -> String {
    names.join(LIST_DELIMITER)
}

pub fn split_names(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) if !raw.is_empty() => {
            raw.split(LIST_DELIMITER).map(str::to_string).collect()
        }
        _ => Vec::new(),
    }
}

/// Per-request settings a caller may override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub language: String,
    /// Upstream API key supplied by the caller instead of the server token.
    pub api_key: Option<String>,
}

impl CallerContext {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.is_empty());
        self
    }
}

/// Kind of title served by a catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment used by the upstream API (`movie` / `tv`); also the value
    /// persisted in the `media_type` columns.
    pub fn tmdb_segment(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }

    /// Name used by callers (`movie` / `series`).
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "series" | "tv" => Ok(MediaKind::Series),
            other => Err(CatalogError::InvalidRequest(format!(
                "unknown media kind: {other}"
            ))),
        }
    }
}

/// Trailer chosen for a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerRef {
    pub key: String,
    pub name: Option<String>,
    pub published_at: Option<String>,
}

/// Normalized per-title record held by the metadata cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: i64,
    pub media_kind: MediaKind,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub original_language: Option<String>,
    pub genres: Vec<String>,
    /// Compact runtime such as `2h05`, `3h` or `45min`.
    pub runtime: Option<String>,
    pub provider_id: Option<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub homepage: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub belongs_to_collection: Option<String>,
    pub production_companies: Vec<String>,
    pub production_countries: Vec<String>,
    pub spoken_languages: Vec<String>,
    pub trailer: Option<TrailerRef>,
    pub directors: Vec<String>,
    pub writers: Vec<String>,
    pub main_cast: Vec<String>,
    pub imdb_id: Option<String>,
}

impl MetadataRecord {
    /// Record with only its identity set.
    pub fn bare(id: i64, media_kind: MediaKind) -> Self {
        Self {
            id,
            media_kind,
            title: None,
            original_title: None,
            overview: None,
            release_date: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            original_language: None,
            genres: Vec::new(),
            runtime: None,
            provider_id: None,
            budget: None,
            revenue: None,
            homepage: None,
            poster_path: None,
            backdrop_path: None,
            tagline: None,
            status: None,
            belongs_to_collection: None,
            production_companies: Vec::new(),
            production_countries: Vec::new(),
            spoken_languages: Vec::new(),
            trailer: None,
            directors: Vec::new(),
            writers: Vec::new(),
            main_cast: Vec::new(),
            imdb_id: None,
        }
    }
}

/// One episode of a series, keyed by `(show_id, season_number, episode_number)`.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct EpisodeRecord {
    pub id: i64,
    pub show_id: i64,
    pub season_number: i64,
    pub episode_number: i64,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub production_code: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
}

/// Streaming provider known to the upstream API.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct ProviderRecord {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRecord {
    pub id: i64,
    pub name: String,
}
