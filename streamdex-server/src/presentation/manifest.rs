use serde::Serialize;
use streamdex_core::{MediaKind, ProviderRecord, discover::AgeRange};

use super::params::CatalogOrder;

pub const MANIFEST_ID: &str = "community.tmdbstreamingcatalogproviders";
pub const ID_PREFIX: &str = "tt:";

/// Add-on description listing one popular and one newest catalog per
/// provider and kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: Vec<&'static str>,
    pub types: Vec<MediaKind>,
    pub id_prefixes: Vec<&'static str>,
    pub catalogs: Vec<CatalogDescriptor>,
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub id: String,
    pub name: String,
    pub extra: Vec<CatalogExtraField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogExtraField {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Genre names offered as catalog filters.
#[derive(Debug, Clone, Default)]
pub struct GenreOptions {
    pub movie: Vec<String>,
    pub series: Vec<String>,
}

impl GenreOptions {
    fn for_kind(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Movie => &self.movie,
            MediaKind::Series => &self.series,
        }
    }
}

/// The age range advertised on every catalog: the configured one when it
/// restricts content, `18+` otherwise.
pub fn advertised_age_range(raw: Option<&str>) -> AgeRange {
    raw.and_then(|raw| raw.parse().ok()).unwrap_or(AgeRange::Adult)
}

pub fn catalog_id(kind: MediaKind, order: CatalogOrder, provider_id: i64) -> String {
    let kind = match kind {
        MediaKind::Movie => "movies",
        MediaKind::Series => "series",
    };
    let order = match order {
        CatalogOrder::Popular => "popular",
        CatalogOrder::Newest => "new",
    };
    format!("tmdb-discover-{kind}-{order}-{provider_id}")
}

fn catalog_name(order: CatalogOrder, provider: &str) -> String {
    match order {
        CatalogOrder::Popular => format!("Popular - {provider}"),
        CatalogOrder::Newest => format!("New - {provider}"),
    }
}

pub fn build_manifest(
    providers: &[ProviderRecord],
    genres: &GenreOptions,
    age_range: AgeRange,
) -> Manifest {
    let catalogs = providers
        .iter()
        .flat_map(|provider| {
            [MediaKind::Movie, MediaKind::Series]
                .into_iter()
                .flat_map(move |kind| {
                    [CatalogOrder::Popular, CatalogOrder::Newest]
                        .into_iter()
                        .map(move |order| (provider, kind, order))
                })
        })
        .map(|(provider, kind, order)| CatalogDescriptor {
            kind,
            id: catalog_id(kind, order, provider.provider_id),
            name: catalog_name(order, &provider.provider_name),
            extra: vec![
                CatalogExtraField {
                    name: "genre",
                    is_required: Some(false),
                    options: Some(genres.for_kind(kind).to_vec()),
                    value: None,
                },
                CatalogExtraField {
                    name: "skip",
                    is_required: Some(false),
                    options: None,
                    value: None,
                },
                CatalogExtraField {
                    name: "ageRange",
                    is_required: None,
                    options: None,
                    value: Some(age_range.to_string()),
                },
            ],
        })
        .collect();

    Manifest {
        id: MANIFEST_ID,
        version: env!("CARGO_PKG_VERSION"),
        name: "TMDB Streaming Catalog Providers",
        description: "Catalog from TMDB streaming providers.",
        resources: vec!["catalog", "meta"],
        types: vec![MediaKind::Movie, MediaKind::Series],
        id_prefixes: vec![ID_PREFIX],
        catalogs,
        behavior_hints: BehaviorHints {
            configurable: true,
            configuration_required: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::params::CatalogId;

    fn provider(id: i64, name: &str) -> ProviderRecord {
        ProviderRecord {
            provider_id: id,
            provider_name: name.into(),
            logo_path: None,
        }
    }

    #[test]
    fn every_provider_gets_popular_and_new_catalogs_per_kind() {
        let genres = GenreOptions {
            movie: vec!["Action".into()],
            series: vec!["Drama".into()],
        };
        let manifest = build_manifest(&[provider(8, "Netflix")], &genres, AgeRange::Adult);

        let ids: Vec<&str> = manifest.catalogs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "tmdb-discover-movies-popular-8",
                "tmdb-discover-movies-new-8",
                "tmdb-discover-series-popular-8",
                "tmdb-discover-series-new-8",
            ]
        );
        assert_eq!(manifest.catalogs[1].name, "New - Netflix");
        assert_eq!(manifest.catalogs[2].extra[0].options, Some(vec!["Drama".to_string()]));
        assert_eq!(manifest.catalogs[0].extra[2].value.as_deref(), Some("18+"));
    }

    #[test]
    fn advertised_ids_parse_back_to_the_same_catalog() {
        for kind in [MediaKind::Movie, MediaKind::Series] {
            for order in [CatalogOrder::Popular, CatalogOrder::Newest] {
                let parsed = CatalogId::parse(&catalog_id(kind, order, 337)).expect("parses");
                assert_eq!(
                    parsed,
                    CatalogId {
                        kind,
                        order,
                        provider_id: 337
                    }
                );
            }
        }
    }

    #[test]
    fn unknown_age_range_advertises_adult() {
        assert_eq!(advertised_age_range(Some("6-11")), AgeRange::SixToEleven);
        assert_eq!(advertised_age_range(Some("kids")), AgeRange::Adult);
        assert_eq!(advertised_age_range(None), AgeRange::Adult);
    }

    #[test]
    fn manifest_serializes_in_camel_case() {
        let manifest = build_manifest(&[], &GenreOptions::default(), AgeRange::Adult);
        let value = serde_json::to_value(&manifest).expect("serialize");

        assert_eq!(value["idPrefixes"], serde_json::json!(["tt:"]));
        assert_eq!(value["behaviorHints"]["configurable"], true);
        assert_eq!(value["types"], serde_json::json!(["movie", "series"]));
        assert!(value["catalogs"].as_array().expect("catalogs").is_empty());
    }
}
