use std::sync::Arc;

use tracing::{debug, warn};

use super::{CacheTier, WriteFailureReporter};
use crate::{
    database::ports::MetadataRepository,
    types::{MediaKind, MetadataRecord},
};

/// Per-title records written by the enricher. No TTL: a record lives until
/// the next enrichment of the same title replaces it.
#[derive(Clone)]
pub struct MetadataCache {
    repo: Arc<dyn MetadataRepository>,
    failures: WriteFailureReporter,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache").finish_non_exhaustive()
    }
}

impl MetadataCache {
    pub fn new(repo: Arc<dyn MetadataRepository>, failures: WriteFailureReporter) -> Self {
        Self { repo, failures }
    }

    pub async fn get(&self, id: i64, kind: MediaKind) -> Option<MetadataRecord> {
        match self.repo.get_metadata(id, kind).await {
            Ok(Some(record)) => {
                debug!(id, kind = %kind, "metadata cache hit");
                Some(record)
            }
            Ok(None) => {
                debug!(id, kind = %kind, "metadata cache miss");
                None
            }
            Err(err) => {
                warn!(id, kind = %kind, "metadata cache read failed, treating as miss: {err}");
                None
            }
        }
    }

    pub async fn put(&self, record: &MetadataRecord) {
        if let Err(err) = self.repo.upsert_metadata(record).await {
            self.failures.report(
                CacheTier::Metadata,
                format!("{}:{}", record.media_kind.tmdb_segment(), record.id),
                &err,
            );
        }
    }
}
