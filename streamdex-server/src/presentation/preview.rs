use serde::{Deserialize, Serialize};
use serde_json::Value;
use streamdex_core::{MediaKind, MetadataRecord};

use super::{
    links::{MetaLink, metadata_links},
    release_year, tmdb_image,
};

pub const BACKGROUND_SIZE: &str = "w1280";

/// The fields of a discover result the previews are built from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoverItem {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
}

impl DiscoverItem {
    /// `None` for results without an id or a poster.
    pub fn from_value(value: &Value) -> Option<Self> {
        let item: Self = serde_json::from_value(value.clone()).ok()?;
        let has_poster = item.poster_path.as_deref().is_some_and(|path| !path.is_empty());
        (item.id > 0 && has_poster).then_some(item)
    }

    /// `2019` for movies, `2019-2022` or `2019-` for series.
    pub fn release_info(&self, kind: MediaKind) -> Option<String> {
        match kind {
            MediaKind::Movie => release_year(self.release_date.as_deref()),
            MediaKind::Series => {
                let start = release_year(self.first_air_date.as_deref())?;
                let end = release_year(self.last_air_date.as_deref()).unwrap_or_default();
                Some(format!("{start}-{end}"))
            }
        }
    }
}

/// Catalog entry as listed in a `{ "metas": [...] }` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPreview {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub name: Option<String>,
    pub poster: String,
    pub background: Option<String>,
    pub description: Option<String>,
    pub release_info: Option<String>,
    pub runtime: Option<String>,
    pub links: Vec<MetaLink>,
}

pub fn build_preview(
    item: DiscoverItem,
    kind: MediaKind,
    poster: String,
    metadata: Option<&MetadataRecord>,
) -> MetaPreview {
    let release_info = item.release_info(kind);
    let name = match kind {
        MediaKind::Movie => item.title.or(item.name),
        MediaKind::Series => item.name.or(item.title),
    };

    MetaPreview {
        id: format!("tt:{}", item.id),
        kind,
        name,
        poster,
        background: item
            .backdrop_path
            .as_deref()
            .map(|path| tmdb_image(BACKGROUND_SIZE, path)),
        description: item.overview,
        release_info,
        runtime: metadata.and_then(|record| record.runtime.clone()),
        links: metadata.map(metadata_links).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn results_without_poster_or_id_are_skipped() {
        assert!(DiscoverItem::from_value(&json!({ "id": 1, "poster_path": null })).is_none());
        assert!(DiscoverItem::from_value(&json!({ "poster_path": "/p.jpg" })).is_none());
        assert!(DiscoverItem::from_value(&json!({ "id": 1, "poster_path": "/p.jpg" })).is_some());
    }

    #[test]
    fn series_release_info_is_a_year_range() {
        let running = DiscoverItem {
            first_air_date: Some("2019-07-26".into()),
            ..Default::default()
        };
        assert_eq!(running.release_info(MediaKind::Series).as_deref(), Some("2019-"));

        let ended = DiscoverItem {
            first_air_date: Some("2019-07-26".into()),
            last_air_date: Some("2024-06-13".into()),
            ..Default::default()
        };
        assert_eq!(ended.release_info(MediaKind::Series).as_deref(), Some("2019-2024"));
        assert_eq!(DiscoverItem::default().release_info(MediaKind::Series), None);
    }

    #[test]
    fn preview_takes_runtime_and_links_from_cached_metadata() {
        let item = DiscoverItem::from_value(&json!({
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/p.jpg",
            "backdrop_path": "/b.jpg",
            "overview": "A hacker learns the truth.",
            "release_date": "1999-03-31"
        }))
        .expect("item");

        let mut record = MetadataRecord::bare(603, MediaKind::Movie);
        record.title = Some("The Matrix".into());
        record.runtime = Some("2h16".into());

        let preview = build_preview(item, MediaKind::Movie, "poster-url".into(), Some(&record));
        let wire = serde_json::to_value(&preview).expect("serialize");

        assert_eq!(wire["id"], "tt:603");
        assert_eq!(wire["type"], "movie");
        assert_eq!(wire["releaseInfo"], "1999");
        assert_eq!(wire["runtime"], "2h16");
        assert_eq!(wire["background"], "https://image.tmdb.org/t/p/w1280/b.jpg");
        assert_eq!(wire["links"][0]["category"], "share");
    }
}
