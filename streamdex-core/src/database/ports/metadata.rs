use async_trait::async_trait;

use crate::{
    error::Result,
    types::{MediaKind, MetadataRecord},
};

#[async_trait]
pub trait MetadataRepository: Send + Sync {
    async fn get_metadata(&self, id: i64, kind: MediaKind) -> Result<Option<MetadataRecord>>;

    /// Last write wins.
    async fn upsert_metadata(&self, record: &MetadataRecord) -> Result<()>;
}
