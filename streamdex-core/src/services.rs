use std::sync::Arc;

use tracing::info;

use crate::{
    batch::BatchFetcher,
    cache::{EpisodeCache, MetadataCache, PosterCache, ResponseCache, WriteFailureReporter},
    config::CatalogConfig,
    cursor::CursorResolver,
    database::sqlite::SqliteCatalogStore,
    discover::DiscoverOrchestrator,
    dispatcher::RequestDispatcher,
    enrichment::DetailEnricher,
    error::Result,
    fetch::CatalogFetcher,
    lookup::MetadataLookup,
    reference::ReferenceData,
    series::EpisodeSync,
    types::CallerContext,
    upstream::Upstream,
};

/// Every pipeline component, wired over one store, one upstream and one
/// dispatcher.
#[derive(Debug, Clone)]
pub struct CatalogServices {
    pub config: CatalogConfig,
    pub store: SqliteCatalogStore,
    pub dispatcher: RequestDispatcher,
    pub failures: WriteFailureReporter,
    pub responses: ResponseCache,
    pub metadata: MetadataCache,
    pub fetcher: CatalogFetcher,
    pub enricher: DetailEnricher,
    pub discover: DiscoverOrchestrator,
    pub lookup: MetadataLookup,
    pub reference: ReferenceData,
    pub posters: PosterCache,
}

impl CatalogServices {
    /// Must be called from within a Tokio runtime.
    pub fn build(
        config: CatalogConfig,
        store: SqliteCatalogStore,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self> {
        let dispatcher = RequestDispatcher::new(config.dispatcher_concurrency)?;
        let failures = WriteFailureReporter::default();
        let cache_repo = Arc::new(store.cache());

        let responses = ResponseCache::new(cache_repo.clone(), config.catalog_ttl(), failures.clone());
        let metadata = MetadataCache::new(Arc::new(store.metadata()), failures.clone());
        let episodes = EpisodeCache::new(Arc::new(store.episodes()), failures.clone());

        let fetcher = CatalogFetcher::new(
            Arc::clone(&upstream),
            config.tmdb_base_url.clone(),
            dispatcher.clone(),
            responses.clone(),
            CursorResolver::new(cache_repo),
        );
        let enricher = DetailEnricher::new(
            upstream,
            config.tmdb_base_url.clone(),
            dispatcher.clone(),
            metadata.clone(),
            responses.clone(),
            config.trailer_fallback_without_language,
        );
        let batch = BatchFetcher::new(enricher.clone(), dispatcher.clone(), config.batch_size);
        let discover =
            DiscoverOrchestrator::new(fetcher.clone(), batch, config.watch_regions.clone());
        let lookup = MetadataLookup::new(
            metadata.clone(),
            EpisodeSync::new(fetcher.clone(), episodes),
        );
        let reference = ReferenceData::new(
            fetcher.clone(),
            Arc::new(store.providers()),
            Arc::new(store.genres()),
            config.watch_regions.clone(),
        );
        let posters = PosterCache::new(&config)?;

        info!(
            regions = ?config.watch_regions,
            concurrency = dispatcher.capacity(),
            "catalog services ready"
        );

        Ok(Self {
            config,
            store,
            dispatcher,
            failures,
            responses,
            metadata,
            fetcher,
            enricher,
            discover,
            lookup,
            reference,
            posters,
        })
    }

    /// Caller context with the configured defaults.
    pub fn default_context(&self) -> CallerContext {
        CallerContext::new(self.config.language.clone())
    }
}
