use async_trait::async_trait;

use crate::{error::Result, types::EpisodeRecord};

#[async_trait]
pub trait EpisodeRepository: Send + Sync {
    /// Episodes of a show ordered by season then episode number.
    async fn episodes_for_show(&self, show_id: i64) -> Result<Vec<EpisodeRecord>>;

    async fn upsert_episode(&self, episode: &EpisodeRecord) -> Result<()>;
}
