use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{
    cache::{PageMemo, ResponseCache},
    cursor::CursorResolver,
    database::ports::QueryShape,
    dispatcher::RequestDispatcher,
    error::{CatalogError, Result},
    upstream::{Upstream, UpstreamRequest},
};

/// Cached, dispatched GETs against the upstream API.
///
/// Every miss is executed as a unit on the shared dispatcher, then written
/// back to the response cache. Paginated catalog requests additionally go
/// through the cursor resolver and record the page they landed on.
#[derive(Clone)]
pub struct CatalogFetcher {
    upstream: Arc<dyn Upstream>,
    base_url: String,
    dispatcher: RequestDispatcher,
    cache: ResponseCache,
    cursor: CursorResolver,
}

impl std::fmt::Debug for CatalogFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogFetcher")
            .field("base_url", &self.base_url)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl CatalogFetcher {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        base_url: impl Into<String>,
        dispatcher: RequestDispatcher,
        cache: ResponseCache,
        cursor: CursorResolver,
    ) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            dispatcher,
            cache,
            cursor,
        }
    }

    /// Fetch a non-paginated resource.
    pub async fn fetch(&self, request: UpstreamRequest) -> Result<Value> {
        let key = request.cache_key(&self.base_url)?;
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let value = self.dispatch(request).await?;
        self.cache.put(&key, &value, None).await;
        Ok(value)
    }

    /// Fetch the upstream page that `skip` resolves to for `shape`.
    pub async fn fetch_page(
        &self,
        mut request: UpstreamRequest,
        shape: &QueryShape,
        skip: i64,
    ) -> Result<Value> {
        let page = self.cursor.resolve(shape, skip).await;
        request.set_param("page", page.to_string());

        let key = request.cache_key(&self.base_url)?;
        debug!(path = request.path(), page, skip, "fetching catalog page");
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let value = self.dispatch(request).await?;
        let memo = PageMemo {
            shape: shape.clone(),
            skip,
            page,
        };
        self.cache.put(&key, &value, Some(&memo)).await;
        Ok(value)
    }

    async fn dispatch(&self, request: UpstreamRequest) -> Result<Value> {
        let upstream = Arc::clone(&self.upstream);
        self.dispatcher
            .run(async move { upstream.get_json(&request).await.map_err(CatalogError::from) })
            .await
    }
}
