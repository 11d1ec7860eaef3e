use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    database::ports::{
        CacheEntry, MemoRow, PageMemoRepository, QueryShape, ResponseCacheRepository,
    },
    error::Result,
};

/// Both views of the `cache` table: freshness lookups by key and the
/// skip-to-page memo by query shape.
#[derive(Clone, Debug)]
pub struct SqliteCacheRepository {
    pool: SqlitePool,
}

impl SqliteCacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponseCacheRepository for SqliteCacheRepository {
    async fn get_fresh(&self, key: &str, now_millis: i64) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM cache WHERE key = ? AND expiration > ?",
        )
        .bind(key)
        .bind(now_millis)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO cache
                (key, value, expiration, page, skip, provider_id, query_type, sort_by, age_range)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.expiration)
        .bind(entry.page)
        .bind(entry.skip)
        .bind(entry.provider_id)
        .bind(&entry.query_type)
        .bind(&entry.sort_by)
        .bind(&entry.age_range)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_expired(&self, now_millis: i64) -> Result<u64> {
        let done = sqlx::query("DELETE FROM cache WHERE expiration <= ?")
            .bind(now_millis)
            .execute(&self.pool)
            .await?;

        Ok(done.rows_affected())
    }
}

#[async_trait]
impl PageMemoRepository for SqliteCacheRepository {
    async fn find_exact(&self, shape: &QueryShape, skip: i64) -> Result<Option<MemoRow>> {
        let row = sqlx::query_as::<_, MemoRow>(
            r#"
            SELECT page, skip FROM cache
            WHERE provider_id = ? AND query_type = ? AND sort_by = ? AND age_range IS ?
              AND skip = ?
            ORDER BY expiration DESC
            LIMIT 1
            "#,
        )
        .bind(shape.provider_id)
        .bind(&shape.query_type)
        .bind(&shape.sort_by)
        .bind(&shape.age_range)
        .bind(skip)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_latest(&self, shape: &QueryShape) -> Result<Option<MemoRow>> {
        let row = sqlx::query_as::<_, MemoRow>(
            r#"
            SELECT page, skip FROM cache
            WHERE provider_id = ? AND query_type = ? AND sort_by = ? AND age_range IS ?
            ORDER BY skip DESC, expiration DESC
            LIMIT 1
            "#,
        )
        .bind(shape.provider_id)
        .bind(&shape.query_type)
        .bind(&shape.sort_by)
        .bind(&shape.age_range)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
