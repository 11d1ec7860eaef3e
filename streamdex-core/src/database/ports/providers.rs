use async_trait::async_trait;

use crate::{error::Result, types::ProviderRecord};

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn upsert_providers(&self, providers: &[ProviderRecord]) -> Result<()>;

    async fn list_providers(&self) -> Result<Vec<ProviderRecord>>;

    async fn get_provider(&self, provider_id: i64) -> Result<Option<ProviderRecord>>;
}
