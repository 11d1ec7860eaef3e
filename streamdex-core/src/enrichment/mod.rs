//! Per-title detail enrichment.
//!
//! A metadata cache hit returns without touching the upstream. A miss
//! fetches details with credits, videos and external ids in one request,
//! optionally retries the video list without a language filter, and writes
//! the normalized record exactly once.

pub mod normalize;

pub use normalize::{TitleDetails, format_runtime, select_trailer};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    cache::{MetadataCache, ResponseCache},
    dispatcher::RequestDispatcher,
    error::{CatalogError, Result},
    types::{CallerContext, MediaKind, MetadataRecord},
    upstream::{Upstream, UpstreamRequest},
};

const DETAIL_APPENDS: &str = "videos,credits,external_ids";

/// Result of enriching one title.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    /// Served from the metadata cache; no upstream call was made.
    Cached(MetadataRecord),
    /// Freshly fetched. `payload` is the raw upstream response.
    Fetched {
        record: MetadataRecord,
        payload: Value,
    },
}

impl Enrichment {
    pub fn record(&self) -> &MetadataRecord {
        match self {
            Enrichment::Cached(record) => record,
            Enrichment::Fetched { record, .. } => record,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Enrichment::Cached(_))
    }
}

#[derive(Clone)]
pub struct DetailEnricher {
    upstream: Arc<dyn Upstream>,
    base_url: String,
    dispatcher: RequestDispatcher,
    metadata: MetadataCache,
    responses: ResponseCache,
    trailer_fallback: bool,
}

impl std::fmt::Debug for DetailEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailEnricher")
            .field("base_url", &self.base_url)
            .field("trailer_fallback", &self.trailer_fallback)
            .finish_non_exhaustive()
    }
}

/// How upstream calls are issued for one enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
    /// Each call becomes its own dispatcher unit.
    Dispatched,
    /// The caller already occupies a dispatcher slot.
    InUnit,
}

impl DetailEnricher {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        base_url: impl Into<String>,
        dispatcher: RequestDispatcher,
        metadata: MetadataCache,
        responses: ResponseCache,
        trailer_fallback: bool,
    ) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            dispatcher,
            metadata,
            responses,
            trailer_fallback,
        }
    }

    /// Enrich one title, routing each upstream call through the dispatcher.
    pub async fn enrich(
        &self,
        id: i64,
        kind: MediaKind,
        context: &CallerContext,
    ) -> Result<Enrichment> {
        self.enrich_with(id, kind, context, CallMode::Dispatched).await
    }

    /// Enrich one title from inside a dispatcher unit. Upstream calls are
    /// made directly so the unit does not wait on a slot it already holds.
    pub async fn enrich_within_unit(
        &self,
        id: i64,
        kind: MediaKind,
        context: &CallerContext,
    ) -> Result<Enrichment> {
        self.enrich_with(id, kind, context, CallMode::InUnit).await
    }

    async fn enrich_with(
        &self,
        id: i64,
        kind: MediaKind,
        context: &CallerContext,
        mode: CallMode,
    ) -> Result<Enrichment> {
        if let Some(record) = self.metadata.get(id, kind).await {
            return Ok(Enrichment::Cached(record));
        }

        let path = format!("/{}/{}", kind.tmdb_segment(), id);
        let request = UpstreamRequest::new(path.clone())
            .param("append_to_response", DETAIL_APPENDS)
            .param("language", context.language.clone())
            .with_api_key(context.api_key.clone());

        let mut payload = self.call(request.clone(), mode).await?;
        let mut details: TitleDetails = serde_json::from_value(payload.clone())?;

        if self.trailer_fallback && !details.has_trailer() {
            info!(id, kind = %kind, "no localized trailer, retrying videos without language");
            let retry = UpstreamRequest::new(path)
                .param("append_to_response", "videos")
                .with_api_key(context.api_key.clone());

            match self.call(retry, mode).await {
                Ok(videos_payload) => {
                    let videos = videos_payload.get("videos").cloned();
                    if let Some(videos) = videos {
                        match serde_json::from_value(videos.clone()) {
                            Ok(list) => {
                                details.videos = Some(list);
                                if let Some(object) = payload.as_object_mut() {
                                    object.insert("videos".to_string(), videos);
                                }
                            }
                            Err(err) => warn!(id, "unreadable video list: {err}"),
                        }
                    }
                }
                Err(err) => warn!(id, "video retry without language failed: {err}"),
            }
        }

        let record = details.into_record(kind);
        self.metadata.put(&record).await;

        match request.cache_key(&self.base_url) {
            Ok(key) => self.responses.put(&key, &payload, None).await,
            Err(err) => warn!(id, "cannot derive cache key for details: {err}"),
        }

        debug!(id, kind = %kind, "title enriched");
        Ok(Enrichment::Fetched { record, payload })
    }

    async fn call(&self, request: UpstreamRequest, mode: CallMode) -> Result<Value> {
        match mode {
            CallMode::InUnit => Ok(self.upstream.get_json(&request).await?),
            CallMode::Dispatched => {
                let upstream = Arc::clone(&self.upstream);
                self.dispatcher
                    .run(async move {
                        upstream.get_json(&request).await.map_err(CatalogError::from)
                    })
                    .await
            }
        }
    }
}
