//! Incremental episode cache refresh for series.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    cache::EpisodeCache,
    error::Result,
    fetch::CatalogFetcher,
    types::{CallerContext, EpisodeRecord},
    upstream::UpstreamRequest,
};

#[derive(Debug, Default, Deserialize)]
struct SeriesSummary {
    #[serde(default)]
    number_of_seasons: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SeasonEpisode {
    id: i64,
    #[serde(default)]
    show_id: Option<i64>,
    #[serde(default)]
    season_number: Option<i64>,
    episode_number: i64,
    #[serde(default)]
    air_date: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    production_code: Option<String>,
    #[serde(default)]
    runtime: Option<i64>,
    #[serde(default)]
    still_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    vote_count: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct SeasonDetails {
    #[serde(default)]
    episodes: Vec<SeasonEpisode>,
}

impl SeasonEpisode {
    fn into_record(self, show_id: i64, season_number: i64) -> EpisodeRecord {
        EpisodeRecord {
            id: self.id,
            show_id: self.show_id.unwrap_or(show_id),
            season_number: self.season_number.unwrap_or(season_number),
            episode_number: self.episode_number,
            air_date: self.air_date,
            name: self.name,
            overview: self.overview,
            production_code: self.production_code,
            runtime: self.runtime,
            still_path: self.still_path,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
        }
    }
}

/// Seasons to refresh given the seasons already cached.
///
/// Nothing cached: every season. Gaps: only the missing seasons. Complete:
/// only the latest season, which is the one still gaining episodes.
pub fn plan_seasons(cached: &BTreeSet<i64>, number_of_seasons: i64) -> Vec<i64> {
    if number_of_seasons < 1 {
        return Vec::new();
    }
    if cached.is_empty() {
        return (1..=number_of_seasons).collect();
    }

    let missing: Vec<i64> = (1..=number_of_seasons)
        .filter(|season| !cached.contains(season))
        .collect();
    if missing.is_empty() {
        vec![number_of_seasons]
    } else {
        missing
    }
}

#[derive(Debug, Clone)]
pub struct EpisodeSync {
    fetcher: CatalogFetcher,
    episodes: EpisodeCache,
}

impl EpisodeSync {
    pub fn new(fetcher: CatalogFetcher, episodes: EpisodeCache) -> Self {
        Self { fetcher, episodes }
    }

    /// Episodes currently cached for `show_id`, without refreshing.
    pub async fn cached(&self, show_id: i64) -> Vec<EpisodeRecord> {
        self.episodes.for_show(show_id).await
    }

    /// Bring the episode cache for `show_id` up to date and return it.
    ///
    /// Fails only when the series summary cannot be fetched; a season that
    /// fails to load is logged and skipped.
    pub async fn sync(&self, show_id: i64, context: &CallerContext) -> Result<Vec<EpisodeRecord>> {
        let cached = self.episodes.for_show(show_id).await;
        let cached_seasons: BTreeSet<i64> =
            cached.iter().map(|episode| episode.season_number).collect();

        let summary_request = UpstreamRequest::new(format!("/tv/{show_id}"))
            .param("language", context.language.clone())
            .with_api_key(context.api_key.clone());
        let summary: SeriesSummary =
            serde_json::from_value(self.fetcher.fetch(summary_request).await?)?;
        let seasons = plan_seasons(&cached_seasons, summary.number_of_seasons.unwrap_or(0));
        info!(show_id, cached = cached.len(), seasons = ?seasons, "syncing episodes");

        for season in seasons {
            let request = UpstreamRequest::new(format!("/tv/{show_id}/season/{season}"))
                .param("language", context.language.clone())
                .with_api_key(context.api_key.clone());

            let details = match self.fetcher.fetch(request).await {
                Ok(value) => serde_json::from_value::<SeasonDetails>(value),
                Err(err) => {
                    warn!(show_id, season, "season fetch failed: {err}");
                    continue;
                }
            };
            let details = match details {
                Ok(details) => details,
                Err(err) => {
                    warn!(show_id, season, "unreadable season payload: {err}");
                    continue;
                }
            };

            debug!(show_id, season, episodes = details.episodes.len(), "caching season");
            for episode in details.episodes {
                self.episodes
                    .put(&episode.into_record(show_id, season))
                    .await;
            }
        }

        Ok(self.episodes.for_show(show_id).await)
    }
}
