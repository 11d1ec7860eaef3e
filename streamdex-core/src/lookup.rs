use tracing::{debug, warn};

use crate::{
    cache::MetadataCache,
    series::EpisodeSync,
    types::{CallerContext, EpisodeRecord, MediaKind, MetadataRecord},
};

/// Cached title plus, for series, its episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMetadata {
    pub record: MetadataRecord,
    pub episodes: Vec<EpisodeRecord>,
}

/// Serves per-title metadata from the metadata cache.
///
/// Only titles already enriched by a catalog request are known here. A
/// missing record is reported as `None`, never as an error.
#[derive(Debug, Clone)]
pub struct MetadataLookup {
    metadata: MetadataCache,
    episodes: EpisodeSync,
}

/// Numeric title id from a caller id, with or without the `tt:` prefix.
pub fn parse_title_id(raw: &str) -> Option<i64> {
    raw.strip_prefix("tt:").unwrap_or(raw).parse().ok()
}

impl MetadataLookup {
    pub fn new(metadata: MetadataCache, episodes: EpisodeSync) -> Self {
        Self { metadata, episodes }
    }

    pub async fn lookup(
        &self,
        kind: MediaKind,
        raw_id: &str,
        context: &CallerContext,
    ) -> Option<TitleMetadata> {
        let Some(id) = parse_title_id(raw_id) else {
            warn!(raw_id, "unrecognized title id");
            return None;
        };

        let Some(record) = self.metadata.get(id, kind).await else {
            debug!(id, kind = %kind, "no cached metadata");
            return None;
        };

        let episodes = match kind {
            MediaKind::Movie => Vec::new(),
            MediaKind::Series => match self.episodes.sync(id, context).await {
                Ok(episodes) => episodes,
                Err(err) => {
                    warn!(id, "episode sync failed, serving cached episodes: {err}");
                    self.episodes.cached(id).await
                }
            },
        };

        Some(TitleMetadata { record, episodes })
    }
}
