//! Upstream detail payloads and their reduction to [`MetadataRecord`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

use crate::types::{MediaKind, MetadataRecord, TrailerRef};

const MAIN_CAST_LEN: usize = 3;

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cast: Vec<Named>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// Movie or series details with `videos,credits,external_ids` appended.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TitleDetails {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub original_language: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub genres: Vec<Named>,
    pub runtime: Option<i64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub episode_run_time: Vec<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub homepage: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub belongs_to_collection: Option<Named>,
    #[serde(deserialize_with = "null_as_empty")]
    pub production_companies: Vec<Named>,
    #[serde(deserialize_with = "null_as_empty")]
    pub production_countries: Vec<Named>,
    #[serde(deserialize_with = "null_as_empty")]
    pub spoken_languages: Vec<Named>,
    pub videos: Option<VideoList>,
    pub credits: Option<Credits>,
    pub external_ids: Option<ExternalIds>,
}

/// Compact runtime: `2h05`, `3h`, `45min`. Zero or absent yields nothing.
pub fn format_runtime(minutes: Option<i64>) -> Option<String> {
    let minutes = minutes.filter(|m| *m > 0)?;
    let hours = minutes / 60;
    let rest = minutes % 60;

    Some(match (hours, rest) {
        (0, rest) => format!("{rest}min"),
        (hours, 0) => format!("{hours}h"),
        (hours, rest) => format!("{hours}h{rest:02}"),
    })
}

fn published(video: &Video) -> Option<DateTime<FixedOffset>> {
    video
        .published_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
}

/// Pick the trailer to surface: official ones first, then the earliest
/// publication. Videos without a publication date rank last.
pub fn select_trailer(videos: &[Video]) -> Option<TrailerRef> {
    videos
        .iter()
        .filter(|video| video.kind.as_deref() == Some("Trailer"))
        .filter(|video| video.key.as_deref().is_some_and(|key| !key.is_empty()))
        .min_by_key(|video| {
            let at = published(video);
            (!video.official, at.is_none(), at)
        })
        .and_then(|video| {
            Some(TrailerRef {
                key: video.key.clone()?,
                name: video.name.clone(),
                published_at: video.published_at.clone(),
            })
        })
}

fn crew_with_job(credits: &Credits, job: &str) -> Vec<String> {
    credits
        .crew
        .iter()
        .filter(|member| member.job.as_deref() == Some(job))
        .filter_map(|member| member.name.clone())
        .collect()
}

fn names(items: &[Named]) -> Vec<String> {
    items.iter().filter_map(|item| item.name.clone()).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

impl TitleDetails {
    pub fn has_trailer(&self) -> bool {
        self.videos
            .as_ref()
            .and_then(|videos| select_trailer(&videos.results))
            .is_some()
    }

    /// Reduce the payload to the cached record. Series fall back to their
    /// `name`, `first_air_date` and first `episode_run_time`.
    pub fn into_record(self, kind: MediaKind) -> MetadataRecord {
        let runtime = self
            .runtime
            .filter(|minutes| *minutes > 0)
            .or_else(|| self.episode_run_time.first().copied());

        let credits = self.credits.unwrap_or_default();
        let trailer = self
            .videos
            .as_ref()
            .and_then(|videos| select_trailer(&videos.results));

        MetadataRecord {
            id: self.id,
            media_kind: kind,
            title: non_empty(self.title).or(self.name),
            original_title: non_empty(self.original_title).or(self.original_name),
            overview: self.overview,
            release_date: non_empty(self.release_date).or(self.first_air_date),
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            original_language: self.original_language,
            genres: names(&self.genres),
            runtime: format_runtime(runtime),
            provider_id: None,
            budget: self.budget,
            revenue: self.revenue,
            homepage: self.homepage,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            tagline: self.tagline,
            status: self.status,
            belongs_to_collection: self.belongs_to_collection.and_then(|c| c.name),
            production_companies: names(&self.production_companies),
            production_countries: names(&self.production_countries),
            spoken_languages: names(&self.spoken_languages),
            trailer,
            directors: crew_with_job(&credits, "Director"),
            writers: crew_with_job(&credits, "Writer"),
            main_cast: credits
                .cast
                .iter()
                .take(MAIN_CAST_LEN)
                .filter_map(|member| member.name.clone())
                .collect(),
            imdb_id: self.external_ids.and_then(|ids| ids.imdb_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trailer(key: &str, official: bool, published_at: &str) -> Video {
        Video {
            key: Some(key.into()),
            name: Some(format!("{key} trailer")),
            kind: Some("Trailer".into()),
            official,
            published_at: Some(published_at.into()),
        }
    }

    #[test]
    fn runtime_formats() {
        assert_eq!(format_runtime(Some(125)).as_deref(), Some("2h05"));
        assert_eq!(format_runtime(Some(180)).as_deref(), Some("3h"));
        assert_eq!(format_runtime(Some(45)).as_deref(), Some("45min"));
        assert_eq!(format_runtime(Some(0)), None);
        assert_eq!(format_runtime(None), None);
    }

    #[test]
    fn official_trailer_beats_earlier_unofficial() {
        let videos = vec![
            trailer("fan", false, "2019-01-01T00:00:00.000Z"),
            trailer("studio", true, "2020-06-01T00:00:00.000Z"),
        ];
        assert_eq!(select_trailer(&videos).expect("trailer").key, "studio");
    }

    #[test]
    fn earliest_official_trailer_wins() {
        let videos = vec![
            trailer("second", true, "2021-03-01T10:00:00.000Z"),
            trailer("first", true, "2021-02-01T10:00:00.000Z"),
        ];
        assert_eq!(select_trailer(&videos).expect("trailer").key, "first");
    }

    #[test]
    fn non_trailers_are_ignored() {
        let teaser = Video {
            kind: Some("Teaser".into()),
            ..trailer("teaser", true, "2020-01-01T00:00:00.000Z")
        };
        assert_eq!(select_trailer(&[teaser]), None);
        assert_eq!(select_trailer(&[]), None);
    }

    #[test]
    fn series_payload_uses_series_fallbacks() {
        let details: TitleDetails = serde_json::from_value(json!({
            "id": 1399,
            "name": "Game of Thrones",
            "original_name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "episode_run_time": [62],
            "genres": [{ "id": 18, "name": "Drama" }],
            "belongs_to_collection": null,
            "production_countries": null,
            "credits": {
                "cast": [
                    { "name": "A" }, { "name": "B" }, { "name": "C" }, { "name": "D" }
                ],
                "crew": [
                    { "name": "Dir", "job": "Director" },
                    { "name": "Wri", "job": "Writer" },
                    { "name": "Pro", "job": "Producer" }
                ]
            },
            "external_ids": { "imdb_id": "tt0944947" }
        }))
        .expect("details");

        let record = details.into_record(MediaKind::Series);
        assert_eq!(record.title.as_deref(), Some("Game of Thrones"));
        assert_eq!(record.release_date.as_deref(), Some("2011-04-17"));
        assert_eq!(record.runtime.as_deref(), Some("1h02"));
        assert_eq!(record.genres, vec!["Drama".to_string()]);
        assert_eq!(record.main_cast, vec!["A", "B", "C"]);
        assert_eq!(record.directors, vec!["Dir"]);
        assert_eq!(record.writers, vec!["Wri"]);
        assert!(record.production_countries.is_empty());
        assert_eq!(record.imdb_id.as_deref(), Some("tt0944947"));
        assert_eq!(record.trailer, None);
    }
}
