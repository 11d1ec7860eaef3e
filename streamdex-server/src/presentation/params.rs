use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use streamdex_core::{CallerContext, MediaKind};
use tracing::warn;

static CATALOG_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^tmdb-discover-(movies|series)(-new|-popular)?-(\d+)$")
        .expect("catalog id regex should compile")
});

/// Drop the `.json` suffix carried by the last path segment.
pub fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrder {
    Popular,
    Newest,
}

/// Catalog identity encoded in ids such as `tmdb-discover-movies-new-8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogId {
    pub kind: MediaKind,
    pub order: CatalogOrder,
    pub provider_id: i64,
}

impl CatalogId {
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = CATALOG_ID_PATTERN.captures(strip_json(raw))?;

        let kind = match captures.get(1)?.as_str() {
            "movies" => MediaKind::Movie,
            _ => MediaKind::Series,
        };
        let order = match captures.get(2).map(|m| m.as_str()) {
            Some("-new") => CatalogOrder::Newest,
            _ => CatalogOrder::Popular,
        };
        let provider_id = captures.get(3)?.as_str().parse().ok()?;

        Some(Self {
            kind,
            order,
            provider_id,
        })
    }

    pub fn sort_by(&self) -> &'static str {
        match (self.order, self.kind) {
            (CatalogOrder::Newest, MediaKind::Movie) => "primary_release_date.desc",
            (CatalogOrder::Newest, MediaKind::Series) => "first_air_date.desc",
            (CatalogOrder::Popular, _) => "popularity.desc",
        }
    }
}

/// `skip=N&genre=Name` extra segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogExtra {
    pub skip: i64,
    pub genre: Option<String>,
}

impl CatalogExtra {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut extra = Self::default();
        let Some(raw) = raw else {
            return extra;
        };

        for pair in strip_json(raw).split('&') {
            match pair.split_once('=') {
                Some(("skip", value)) => {
                    extra.skip = value.trim().parse::<i64>().unwrap_or(0).max(0);
                }
                Some(("genre", value)) if !value.is_empty() => {
                    extra.genre = Some(value.to_string());
                }
                _ => {}
            }
        }
        extra
    }
}

/// Per-install settings carried as JSON in the first path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub age_range: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub rpdb_api_key: Option<String>,
    pub language: Option<String>,
    #[serde(deserialize_with = "provider_ids")]
    pub providers: Vec<i64>,
}

/// Provider ids arrive as numbers or numeric strings; anything else is
/// dropped.
fn provider_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let raw = Option::<Vec<RawId>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|id| match id {
            RawId::Number(id) => Some(id),
            RawId::Text(text) => text.trim().parse().ok(),
            RawId::Other(_) => None,
        })
        .collect())
}

impl ClientConfig {
    /// Malformed settings are logged and ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<Self>(raw) {
            Ok(config) => config.normalized(),
            Err(err) => {
                warn!("ignoring malformed client config: {err}");
                Self::default()
            }
        }
    }

    fn normalized(self) -> Self {
        let keep = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            age_range: keep(self.age_range),
            tmdb_api_key: keep(self.tmdb_api_key),
            rpdb_api_key: keep(self.rpdb_api_key),
            language: keep(self.language),
            providers: self.providers,
        }
    }

    pub fn context(&self, default_language: &str) -> CallerContext {
        CallerContext::new(
            self.language
                .clone()
                .unwrap_or_else(|| default_language.to_string()),
        )
        .with_api_key(self.tmdb_api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_select_kind_order_and_provider() {
        let newest = CatalogId::parse("tmdb-discover-movies-new-8.json").expect("valid id");
        assert_eq!(newest.kind, MediaKind::Movie);
        assert_eq!(newest.provider_id, 8);
        assert_eq!(newest.sort_by(), "primary_release_date.desc");

        let series = CatalogId::parse("tmdb-discover-series-new-337").expect("valid id");
        assert_eq!(series.sort_by(), "first_air_date.desc");

        let popular = CatalogId::parse("tmdb-discover-series-popular-9").expect("valid id");
        assert_eq!(popular.sort_by(), "popularity.desc");
        assert_eq!(
            CatalogId::parse("tmdb-discover-movies-119").map(|id| id.order),
            Some(CatalogOrder::Popular)
        );
    }

    #[test]
    fn unknown_catalog_ids_are_rejected() {
        assert!(CatalogId::parse("tmdb-discover-anime-8").is_none());
        assert!(CatalogId::parse("tmdb-discover-movies-latest-8").is_none());
        assert!(CatalogId::parse("discover-movies-8").is_none());
    }

    #[test]
    fn extra_carries_skip_and_genre_in_any_order() {
        assert_eq!(
            CatalogExtra::parse(Some("skip=40&genre=Science Fiction.json")),
            CatalogExtra {
                skip: 40,
                genre: Some("Science Fiction".into())
            }
        );
        assert_eq!(
            CatalogExtra::parse(Some("genre=Drama&skip=20")),
            CatalogExtra {
                skip: 20,
                genre: Some("Drama".into())
            }
        );
        assert_eq!(CatalogExtra::parse(Some("skip=abc")).skip, 0);
        assert_eq!(CatalogExtra::parse(None), CatalogExtra::default());
    }

    #[test]
    fn client_config_reads_camel_case_json() {
        let config = ClientConfig::parse(Some(
            r#"{"ageRange":"12-15","tmdbApiKey":"abc","rpdbApiKey":"","language":"fr-FR"}"#,
        ));
        assert_eq!(config.age_range.as_deref(), Some("12-15"));
        assert_eq!(config.rpdb_api_key, None);

        let context = config.context("en-US");
        assert_eq!(context.language, "fr-FR");
        assert_eq!(context.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn client_config_reads_provider_ids_as_numbers_or_strings() {
        let config = ClientConfig::parse(Some(r#"{"providers":[8,"337",null,"x"]}"#));
        assert_eq!(config.providers, vec![8, 337]);

        assert!(ClientConfig::parse(Some("{}")).providers.is_empty());
    }

    #[test]
    fn malformed_client_config_falls_back_to_defaults() {
        let config = ClientConfig::parse(Some("{not json"));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.context("en-US").language, "en-US");
    }
}
