use async_trait::async_trait;

use crate::error::Result;

/// Identifies one pagination sequence: a provider's catalog of one content
/// type under one sort order and age filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryShape {
    pub provider_id: i64,
    pub query_type: String,
    pub sort_by: String,
    pub age_range: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct MemoRow {
    pub page: i64,
    pub skip: i64,
}

/// Pagination view over the `cache` table. Expiration is ignored here:
/// stale rows still describe where a skip offset landed.
#[async_trait]
pub trait PageMemoRepository: Send + Sync {
    async fn find_exact(&self, shape: &QueryShape, skip: i64) -> Result<Option<MemoRow>>;

    /// Row with the greatest recorded skip for the shape.
    async fn find_latest(&self, shape: &QueryShape) -> Result<Option<MemoRow>>;
}
