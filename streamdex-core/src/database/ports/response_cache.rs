use async_trait::async_trait;

use crate::error::Result;

/// Row of the shared `cache` table.
///
/// `value` is the serialized upstream response; the trailing fields record
/// which page a skip offset resolved to for a given query shape.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    /// Absolute expiry, milliseconds since the Unix epoch.
    pub expiration: i64,
    pub page: i64,
    pub skip: i64,
    pub provider_id: Option<i64>,
    pub query_type: Option<String>,
    pub sort_by: Option<String>,
    pub age_range: Option<String>,
}

/// Freshness view over the `cache` table.
#[async_trait]
pub trait ResponseCacheRepository: Send + Sync {
    /// Value stored under `key` if it expires after `now_millis`.
    async fn get_fresh(&self, key: &str, now_millis: i64) -> Result<Option<String>>;

    /// Insert or replace the row for `entry.key`.
    async fn put(&self, entry: &CacheEntry) -> Result<()>;

    /// Remove rows whose expiration is at or before `now_millis`.
    async fn delete_expired(&self, now_millis: i64) -> Result<u64>;
}
