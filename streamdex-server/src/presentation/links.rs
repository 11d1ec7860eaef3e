use serde::Serialize;
use streamdex_core::{MediaKind, MetadataRecord};
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaLink {
    pub name: String,
    pub category: String,
    pub url: String,
}

impl MetaLink {
    fn new(name: impl Into<String>, category: &str, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.to_string(),
            url: url.into(),
        }
    }
}

/// Percent-encode a URI component, spaces as `%20`.
fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn search_link(name: &str, category: &str) -> MetaLink {
    MetaLink::new(
        name,
        category,
        format!("stremio:///search?search={}", encode_component(name)),
    )
}

/// `{kind}/{title-slug}-{imdb digits}` path of a share link.
pub fn share_slug(kind: MediaKind, title: &str, imdb_id: Option<&str>) -> String {
    let slug = title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let imdb = imdb_id.map(|id| id.replacen("tt", "", 1)).unwrap_or_default();
    format!("{}/{slug}-{imdb}", kind.as_str())
}

/// Genre, crew, rating and share links of a cached title.
pub fn metadata_links(record: &MetadataRecord) -> Vec<MetaLink> {
    let mut links: Vec<MetaLink> = record
        .genres
        .iter()
        .map(|genre| MetaLink::new(genre, "Genres", "stremio:///discover"))
        .collect();

    links.extend(record.directors.iter().map(|name| search_link(name, "Directors")));
    links.extend(record.main_cast.iter().map(|name| search_link(name, "Cast")));

    if let (Some(vote), Some(imdb_id)) = (record.vote_average, record.imdb_id.as_deref()) {
        if vote > 0.0 {
            links.push(MetaLink::new(
                format!("{vote:.1}"),
                "imdb",
                format!("https://imdb.com/title/{imdb_id}"),
            ));
        }
    }

    if let Some(title) = record.title.as_deref() {
        links.push(MetaLink::new(
            title,
            "share",
            format!(
                "https://www.strem.io/s/{}",
                share_slug(record.media_kind, title, record.imdb_id.as_deref())
            ),
        ));
    }

    links
}
