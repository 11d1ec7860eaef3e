use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{database::ports::ProviderRepository, error::Result, types::ProviderRecord};

#[derive(Clone, Debug)]
pub struct SqliteProviderRepository {
    pool: SqlitePool,
}

impl SqliteProviderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderRepository for SqliteProviderRepository {
    async fn upsert_providers(&self, providers: &[ProviderRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for provider in providers {
            sqlx::query(
                r#"
                INSERT INTO providers (provider_id, provider_name, logo_path)
                VALUES (?, ?, ?)
                ON CONFLICT(provider_id) DO UPDATE SET
                    provider_name = excluded.provider_name,
                    logo_path = excluded.logo_path
                "#,
            )
            .bind(provider.provider_id)
            .bind(&provider.provider_name)
            .bind(&provider.logo_path)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_providers(&self) -> Result<Vec<ProviderRecord>> {
        let rows = sqlx::query_as::<_, ProviderRecord>(
            "SELECT provider_id, provider_name, logo_path FROM providers ORDER BY provider_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_provider(&self, provider_id: i64) -> Result<Option<ProviderRecord>> {
        let row = sqlx::query_as::<_, ProviderRecord>(
            "SELECT provider_id, provider_name, logo_path FROM providers WHERE provider_id = ?",
        )
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sqlite::SqliteCatalogStore;

    fn provider(id: i64, name: &str) -> ProviderRecord {
        ProviderRecord {
            provider_id: id,
            provider_name: name.into(),
            logo_path: None,
        }
    }

    #[tokio::test]
    async fn upsert_updates_and_lists_by_name() {
        let store = SqliteCatalogStore::connect_in_memory().await.expect("store");
        let repo = store.providers();

        repo.upsert_providers(&[provider(8, "Netflix"), provider(337, "Disney Plus")])
            .await
            .expect("first");
        repo.upsert_providers(&[ProviderRecord {
            logo_path: Some("/netflix.jpg".into()),
            ..provider(8, "Netflix")
        }])
        .await
        .expect("second");

        let listed = repo.list_providers().await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].provider_name, "Disney Plus");
        assert_eq!(listed[1].logo_path.as_deref(), Some("/netflix.jpg"));

        let netflix = repo.get_provider(8).await.expect("get");
        assert_eq!(netflix.map(|p| p.provider_name).as_deref(), Some("Netflix"));
        assert!(repo.get_provider(119).await.expect("get").is_none());
    }
}
