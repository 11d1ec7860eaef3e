use serde::Serialize;
use streamdex_core::{EpisodeRecord, MediaKind, lookup::TitleMetadata};

use super::{
    links::{MetaLink, metadata_links},
    release_year, released_at, tmdb_image,
};

const EPISODE_STILL_SIZE: &str = "w500";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trailer {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeVideo {
    pub id: String,
    pub title: String,
    pub released: Option<String>,
    pub thumbnail: Option<String>,
    pub episode: i64,
    pub season: i64,
    pub overview: String,
}

impl EpisodeVideo {
    fn from_record(episode: &EpisodeRecord) -> Self {
        Self {
            id: format!(
                "{}:{}:{}",
                episode.show_id, episode.season_number, episode.episode_number
            ),
            title: episode.name.clone().unwrap_or_else(|| "No Title".to_string()),
            released: released_at(episode.air_date.as_deref()),
            thumbnail: episode
                .still_path
                .as_deref()
                .map(|path| tmdb_image(EPISODE_STILL_SIZE, path)),
            episode: episode.episode_number,
            season: episode.season_number,
            overview: episode
                .overview
                .clone()
                .filter(|overview| !overview.is_empty())
                .unwrap_or_else(|| "No Overview".to_string()),
        }
    }
}

/// Full meta object for one title.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaObject {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub name: Option<String>,
    pub background: Option<String>,
    pub description: Option<String>,
    pub release_info: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub trailers: Vec<Trailer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<EpisodeVideo>>,
    pub links: Vec<MetaLink>,
}

pub fn build_meta(title: &TitleMetadata) -> MetaObject {
    let record = &title.record;
    let release_date = record.release_date.as_deref();

    MetaObject {
        id: record.imdb_id.clone(),
        kind: record.media_kind,
        name: record.title.clone(),
        background: record
            .backdrop_path
            .as_deref()
            .map(|path| tmdb_image("original", path)),
        description: record.overview.clone(),
        release_info: release_year(release_date),
        released: released_at(release_date),
        runtime: record.runtime.clone(),
        language: record.original_language.clone(),
        country: record.production_countries.first().cloned(),
        trailers: record
            .trailer
            .iter()
            .map(|trailer| Trailer {
                source: trailer.key.clone(),
                kind: "Trailer",
            })
            .collect(),
        videos: match record.media_kind {
            MediaKind::Movie => None,
            MediaKind::Series => Some(title.episodes.iter().map(EpisodeVideo::from_record).collect()),
        },
        links: metadata_links(record),
    }
}
