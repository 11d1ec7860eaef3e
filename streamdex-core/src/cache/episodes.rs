use std::sync::Arc;

use tracing::warn;

use super::{CacheTier, WriteFailureReporter};
use crate::{database::ports::EpisodeRepository, types::EpisodeRecord};

#[derive(Clone)]
pub struct EpisodeCache {
    repo: Arc<dyn EpisodeRepository>,
    failures: WriteFailureReporter,
}

impl std::fmt::Debug for EpisodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpisodeCache").finish_non_exhaustive()
    }
}

impl EpisodeCache {
    pub fn new(repo: Arc<dyn EpisodeRepository>, failures: WriteFailureReporter) -> Self {
        Self { repo, failures }
    }

    /// Cached episodes of a show; empty on a read error.
    pub async fn for_show(&self, show_id: i64) -> Vec<EpisodeRecord> {
        match self.repo.episodes_for_show(show_id).await {
            Ok(episodes) => episodes,
            Err(err) => {
                warn!(show_id, "episode cache read failed, treating as empty: {err}");
                Vec::new()
            }
        }
    }

    pub async fn put(&self, episode: &EpisodeRecord) {
        if let Err(err) = self.repo.upsert_episode(episode).await {
            self.failures.report(
                CacheTier::Episode,
                format!(
                    "{}:{}:{}",
                    episode.show_id, episode.season_number, episode.episode_number
                ),
                &err,
            );
        }
    }
}
