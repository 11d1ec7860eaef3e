//! Catalog pages across watch regions.

pub mod age_range;

pub use age_range::AgeRange;

use std::collections::HashSet;

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    batch::BatchFetcher,
    database::ports::QueryShape,
    error::{CatalogError, Result},
    fetch::CatalogFetcher,
    types::{CallerContext, MediaKind},
    upstream::UpstreamRequest,
};

/// One catalog page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub kind: MediaKind,
    /// Watch providers; the first one keys the pagination memo.
    pub provider_ids: Vec<i64>,
    pub sort_by: String,
    pub genre_id: Option<i64>,
    /// Raw age-range tag as sent by the caller.
    pub age_range: Option<String>,
    pub skip: i64,
    pub context: CallerContext,
}

/// Merged page: the first region's envelope with the de-duplicated results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPage {
    #[serde(flatten)]
    pub envelope: Map<String, Value>,
    pub results: Vec<Value>,
}

impl CatalogPage {
    pub fn total_results(&self) -> Option<i64> {
        self.envelope.get("total_results").and_then(Value::as_i64)
    }
}

#[derive(Debug, Clone)]
pub struct DiscoverOrchestrator {
    fetcher: CatalogFetcher,
    batch: BatchFetcher,
    regions: Vec<String>,
}

impl DiscoverOrchestrator {
    pub fn new(fetcher: CatalogFetcher, batch: BatchFetcher, regions: Vec<String>) -> Self {
        Self {
            fetcher,
            batch,
            regions,
        }
    }

    /// Fetch the page in every region, merge, and enrich the merged titles
    /// before returning. Any region failing to fetch fails the page.
    pub async fn discover(&self, query: &DiscoverQuery) -> Result<CatalogPage> {
        let provider_id = *query.provider_ids.first().ok_or_else(|| {
            CatalogError::InvalidRequest("discover needs at least one provider".into())
        })?;

        let shape = QueryShape {
            provider_id,
            query_type: query.kind.as_str().to_string(),
            sort_by: query.sort_by.clone(),
            age_range: query.age_range.clone(),
        };
        let base = build_request(query);

        let requests: Vec<UpstreamRequest> = if self.regions.is_empty() {
            vec![base]
        } else {
            self.regions
                .iter()
                .map(|region| base.clone().param("watch_region", region.clone()))
                .collect()
        };

        let pages = join_all(
            requests
                .into_iter()
                .map(|request| self.fetcher.fetch_page(request, &shape, query.skip)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<Value>>>()?;

        let page = merge_pages(pages);
        debug!(
            kind = %query.kind,
            provider_id,
            skip = query.skip,
            results = page.results.len(),
            "regions merged"
        );

        let ids: Vec<i64> = page
            .results
            .iter()
            .filter_map(|item| item.get("id").and_then(Value::as_i64))
            .collect();
        let outcome = self.batch.enrich_all(&ids, query.kind, &query.context).await;
        info!(
            kind = %query.kind,
            provider_id,
            titles = ids.len(),
            enriched = outcome.enriched.len(),
            failed = outcome.failures,
            "catalog page ready"
        );

        Ok(page)
    }
}

fn build_request(query: &DiscoverQuery) -> UpstreamRequest {
    let providers = query
        .provider_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let mut request = UpstreamRequest::new(format!("/discover/{}", query.kind.tmdb_segment()))
        .param("with_watch_providers", providers)
        .param("sort_by", query.sort_by.clone())
        .param("language", query.context.language.clone())
        .with_api_key(query.context.api_key.clone());

    if let Some(raw) = query.age_range.as_deref() {
        match raw.parse::<AgeRange>() {
            Ok(range) => {
                for (key, value) in range.constraints(query.kind) {
                    request.set_param(key, value);
                }
            }
            Err(_) => warn!(age_range = raw, "unknown age range, no filter applied"),
        }
    }

    if let Some(genre_id) = query.genre_id {
        request.set_param("with_genres", genre_id.to_string());
    }

    request
}

/// Concatenate region results in region order, keeping the first
/// occurrence of each title id. Items without an id are dropped.
fn merge_pages(pages: Vec<Value>) -> CatalogPage {
    let mut seen = HashSet::new();
    let mut results = Vec::new();
    let mut envelope = None;

    for page in pages {
        let Value::Object(mut object) = page else {
            warn!("discover response is not an object, skipping");
            continue;
        };
        let items = match object.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        if envelope.is_none() {
            envelope = Some(object);
        }

        for item in items {
            match item.get("id").and_then(Value::as_i64) {
                Some(id) if seen.insert(id) => results.push(item),
                Some(_) => {}
                None => warn!("discover result without id, skipping"),
            }
        }
    }

    CatalogPage {
        envelope: envelope.unwrap_or_default(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::{MetadataCache, ResponseCache, WriteFailureReporter},
        cursor::CursorResolver,
        database::{ports::MetadataRepository, sqlite::SqliteCatalogStore},
        dispatcher::RequestDispatcher,
        enrichment::DetailEnricher,
        error::UpstreamError,
        upstream::Upstream,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn query(age_range: Option<&str>, genre_id: Option<i64>) -> DiscoverQuery {
        DiscoverQuery {
            kind: MediaKind::Movie,
            provider_ids: vec![8],
            sort_by: "popularity.desc".into(),
            genre_id,
            age_range: age_range.map(str::to_string),
            skip: 0,
            context: CallerContext::new("en-US"),
        }
    }

    #[test]
    fn merge_keeps_first_occurrence_in_region_order() {
        let page = merge_pages(vec![
            json!({ "page": 1, "total_results": 40, "results": [{ "id": 1 }, { "id": 2 }] }),
            json!({ "page": 1, "total_results": 99, "results": [{ "id": 3 }, { "id": 1, "dup": true }] }),
        ]);

        let ids: Vec<i64> = page.results.iter().filter_map(|r| r["id"].as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(page.results[0].get("dup").is_none());
        assert_eq!(page.total_results(), Some(40));
    }

    #[test]
    fn page_serializes_with_flattened_envelope() {
        let page = merge_pages(vec![json!({ "page": 2, "results": [{ "id": 5 }] })]);
        assert_eq!(
            serde_json::to_value(&page).expect("serialize"),
            json!({ "page": 2, "results": [{ "id": 5 }] })
        );
    }

    #[test]
    fn age_range_and_genre_shape_the_request() {
        let request = build_request(&query(Some("6-11"), None));
        assert_eq!(request.get_param("certification"), Some("G"));
        assert_eq!(request.get_param("with_genres"), None);

        let request = build_request(&query(Some("6-11"), Some(35)));
        assert_eq!(request.get_param("without_genres"), Some(age_range::CHILD_EXCLUDED_GENRES));
        assert_eq!(request.get_param("with_genres"), Some("35"));

        let request = build_request(&query(Some("toddler"), None));
        assert_eq!(request.get_param("certification"), None);
        assert_eq!(request.get_param("with_watch_providers"), Some("8"));
    }

    /// Serves discover pages per region and bare details for enrichment.
    #[derive(Default)]
    struct RegionalUpstream {
        discover_calls: Mutex<Vec<(Option<String>, Option<String>)>>,
        fail_region: Option<String>,
    }

    #[async_trait]
    impl Upstream for RegionalUpstream {
        async fn get_json(&self, request: &UpstreamRequest) -> std::result::Result<Value, UpstreamError> {
            if request.path().starts_with("/discover/") {
                let region = request.get_param("watch_region").map(str::to_string);
                self.discover_calls
                    .lock()
                    .expect("lock")
                    .push((region.clone(), request.get_param("page").map(str::to_string)));
                if region.is_some() && region == self.fail_region {
                    return Err(UpstreamError::RateLimited);
                }
                let results = match region.as_deref() {
                    Some("FR") => json!([{ "id": 10 }, { "id": 11 }]),
                    Some("US") => json!([{ "id": 11 }, { "id": 12 }]),
                    _ => json!([{ "id": 10 }]),
                };
                return Ok(json!({ "page": 1, "total_results": 3, "results": results }));
            }

            let id: i64 = request
                .path()
                .rsplit('/')
                .next()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default();
            Ok(json!({ "id": id, "title": format!("title {id}") }))
        }
    }

    async fn orchestrator(
        upstream: Arc<RegionalUpstream>,
        regions: &[&str],
    ) -> (SqliteCatalogStore, DiscoverOrchestrator) {
        let store = SqliteCatalogStore::connect_in_memory().await.expect("store");
        let failures = WriteFailureReporter::default();
        let dispatcher = RequestDispatcher::new(4).expect("dispatcher");
        let responses = ResponseCache::new(
            Arc::new(store.cache()),
            chrono::Duration::days(3),
            failures.clone(),
        );
        let fetcher = CatalogFetcher::new(
            upstream.clone(),
            "https://api.example.test/3",
            dispatcher.clone(),
            responses.clone(),
            CursorResolver::new(Arc::new(store.cache())),
        );
        let enricher = DetailEnricher::new(
            upstream,
            "https://api.example.test/3",
            dispatcher.clone(),
            MetadataCache::new(Arc::new(store.metadata()), failures),
            responses,
            false,
        );
        let batch = BatchFetcher::new(enricher, dispatcher, 20);
        let regions = regions.iter().map(|r| r.to_string()).collect();
        (store, DiscoverOrchestrator::new(fetcher, batch, regions))
    }

    #[tokio::test]
    async fn regions_are_merged_and_enriched() {
        let upstream = Arc::new(RegionalUpstream::default());
        let (store, orchestrator) = orchestrator(upstream.clone(), &["FR", "US"]).await;

        let page = orchestrator.discover(&query(None, None)).await.expect("discover");

        let ids: Vec<i64> = page.results.iter().filter_map(|r| r["id"].as_i64()).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        for id in ids {
            assert!(
                store
                    .metadata()
                    .get_metadata(id, MediaKind::Movie)
                    .await
                    .expect("read")
                    .is_some(),
                "title {id} was not enriched"
            );
        }

        let mut calls = upstream.discover_calls.lock().expect("lock").clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                (Some("FR".to_string()), Some("1".to_string())),
                (Some("US".to_string()), Some("1".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn no_regions_queries_once_without_region() {
        let upstream = Arc::new(RegionalUpstream::default());
        let (_store, orchestrator) = orchestrator(upstream.clone(), &[]).await;

        let page = orchestrator.discover(&query(None, None)).await.expect("discover");

        assert_eq!(page.results.len(), 1);
        assert_eq!(
            *upstream.discover_calls.lock().expect("lock"),
            vec![(None, Some("1".to_string()))]
        );
    }

    #[tokio::test]
    async fn failing_region_fails_the_page() {
        let upstream = Arc::new(RegionalUpstream {
            fail_region: Some("US".into()),
            ..RegionalUpstream::default()
        });
        let (_store, orchestrator) = orchestrator(upstream, &["FR", "US"]).await;

        assert!(orchestrator.discover(&query(None, None)).await.is_err());
    }

    #[tokio::test]
    async fn repeated_page_is_served_from_cache() {
        let upstream = Arc::new(RegionalUpstream::default());
        let (_store, orchestrator) = orchestrator(upstream.clone(), &["FR"]).await;

        let first = orchestrator.discover(&query(None, None)).await.expect("first");
        let second = orchestrator.discover(&query(None, None)).await.expect("second");

        assert_eq!(first, second);
        assert_eq!(upstream.discover_calls.lock().expect("lock").len(), 1);
    }
}
