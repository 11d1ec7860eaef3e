use tracing::{debug, warn};

use crate::{
    dispatcher::RequestDispatcher,
    enrichment::{DetailEnricher, Enrichment},
    types::{CallerContext, MediaKind},
};

/// Outcome of enriching a list of titles.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful enrichments in input order; failed titles are absent.
    pub enriched: Vec<Enrichment>,
    pub batch_sizes: Vec<usize>,
    pub failures: usize,
}

/// Drives the enricher over many titles in fixed-size batches.
///
/// Each batch is one dispatcher cohort; the next batch is submitted only
/// after the previous cohort has drained.
#[derive(Debug, Clone)]
pub struct BatchFetcher {
    enricher: DetailEnricher,
    dispatcher: RequestDispatcher,
    batch_size: usize,
}

impl BatchFetcher {
    pub fn new(enricher: DetailEnricher, dispatcher: RequestDispatcher, batch_size: usize) -> Self {
        Self {
            enricher,
            dispatcher,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn enrich_all(
        &self,
        ids: &[i64],
        kind: MediaKind,
        context: &CallerContext,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, batch) in ids.chunks(self.batch_size).enumerate() {
            let mut cohort = self.dispatcher.cohort();
            for &id in batch {
                let enricher = self.enricher.clone();
                let context = context.clone();
                cohort.submit(async move {
                    (id, enricher.enrich_within_unit(id, kind, &context).await)
                });
            }
            outcome.batch_sizes.push(cohort.len());

            for joined in cohort.drain().await {
                match joined {
                    Ok((_, Ok(enrichment))) => outcome.enriched.push(enrichment),
                    Ok((id, Err(err))) => {
                        warn!(id, kind = %kind, "enrichment failed: {err}");
                        outcome.failures += 1;
                    }
                    Err(err) => {
                        warn!(kind = %kind, "enrichment unit did not complete: {err}");
                        outcome.failures += 1;
                    }
                }
            }
            debug!(batch = index, size = batch.len(), "enrichment batch drained");
        }

        outcome
    }
}
