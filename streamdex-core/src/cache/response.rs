use std::{sync::Arc, time::Duration};

use chrono::Utc;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{CacheTier, WriteFailureReporter, redact_key};
use crate::{
    database::ports::{CacheEntry, QueryShape, ResponseCacheRepository},
    error::Result,
};

/// Where a skip offset landed for one query shape. Stored alongside the
/// response it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMemo {
    pub shape: QueryShape,
    pub skip: i64,
    pub page: i64,
}

/// TTL cache of raw upstream responses keyed by request URL.
#[derive(Clone)]
pub struct ResponseCache {
    repo: Arc<dyn ResponseCacheRepository>,
    ttl: chrono::Duration,
    failures: WriteFailureReporter,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    pub fn new(
        repo: Arc<dyn ResponseCacheRepository>,
        ttl: chrono::Duration,
        failures: WriteFailureReporter,
    ) -> Self {
        Self {
            repo,
            ttl,
            failures,
        }
    }

    /// Fresh value for `key`. Storage and decode errors count as a miss.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = Utc::now().timestamp_millis();
        let raw = match self.repo.get_fresh(key, now).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %redact_key(key), "response cache miss");
                return None;
            }
            Err(err) => {
                warn!(key = %redact_key(key), "response cache read failed, treating as miss: {err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %redact_key(key), "response cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(key = %redact_key(key), "cached response is not valid JSON, treating as miss: {err}");
                None
            }
        }
    }

    /// Store `value` under `key`, recording the page memo when given.
    pub async fn put(&self, key: &str, value: &Value, memo: Option<&PageMemo>) {
        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(err) => {
                self.failures.report(CacheTier::Response, key, &err);
                return;
            }
        };

        let expiration = (Utc::now() + self.ttl).timestamp_millis();
        let entry = match memo {
            Some(memo) => CacheEntry {
                key: key.to_string(),
                value: serialized,
                expiration,
                page: memo.page,
                skip: memo.skip,
                provider_id: Some(memo.shape.provider_id),
                query_type: Some(memo.shape.query_type.clone()),
                sort_by: Some(memo.shape.sort_by.clone()),
                age_range: memo.shape.age_range.clone(),
            },
            None => CacheEntry {
                key: key.to_string(),
                value: serialized,
                expiration,
                page: 1,
                skip: 0,
                provider_id: None,
                query_type: None,
                sort_by: None,
                age_range: None,
            },
        };

        match self.repo.put(&entry).await {
            Ok(()) => debug!(
                key = %redact_key(key),
                page = entry.page,
                skip = entry.skip,
                "response cached"
            ),
            Err(err) => self.failures.report(CacheTier::Response, key, &err),
        }
    }

    /// Delete every row past its expiration.
    pub async fn sweep(&self) -> Result<u64> {
        let removed = self
            .repo
            .delete_expired(Utc::now().timestamp_millis())
            .await?;
        info!(removed, "response cache sweep completed");
        Ok(removed)
    }

    /// Run [`ResponseCache::sweep`] every `interval` until the runtime shuts
    /// down. The first sweep runs immediately.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = cache.sweep().await {
                    error!("response cache sweep failed: {err}");
                }
            }
        })
    }
}
