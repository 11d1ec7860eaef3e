//! Provider and genre reference tables.

use std::{collections::HashSet, sync::Arc};

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    database::ports::{GenreRepository, ProviderRepository},
    error::Result,
    fetch::CatalogFetcher,
    types::{CallerContext, GenreRecord, MediaKind, ProviderRecord},
    upstream::UpstreamRequest,
};

#[derive(Debug, Default, Deserialize)]
struct ProviderList {
    #[serde(default)]
    results: Vec<ProviderRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<GenreRecord>,
}

/// Keep the first provider seen under each name, in encounter order.
pub fn merge_providers(providers: impl IntoIterator<Item = ProviderRecord>) -> Vec<ProviderRecord> {
    let mut seen = HashSet::new();
    providers
        .into_iter()
        .filter(|provider| seen.insert(provider.provider_name.clone()))
        .collect()
}

#[derive(Clone)]
pub struct ReferenceData {
    fetcher: CatalogFetcher,
    providers: Arc<dyn ProviderRepository>,
    genres: Arc<dyn GenreRepository>,
    regions: Vec<String>,
}

impl std::fmt::Debug for ReferenceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceData")
            .field("regions", &self.regions)
            .finish_non_exhaustive()
    }
}

impl ReferenceData {
    pub fn new(
        fetcher: CatalogFetcher,
        providers: Arc<dyn ProviderRepository>,
        genres: Arc<dyn GenreRepository>,
        regions: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            providers,
            genres,
            regions,
        }
    }

    /// Fetch movie and series providers for every region and upsert the
    /// merged list. Returns the number of providers written.
    pub async fn refresh_providers(&self, context: &CallerContext) -> Result<usize> {
        let regions: Vec<Option<&str>> = if self.regions.is_empty() {
            vec![None]
        } else {
            self.regions.iter().map(|region| Some(region.as_str())).collect()
        };

        let mut requests = Vec::new();
        for region in regions {
            for kind in [MediaKind::Movie, MediaKind::Series] {
                let mut request =
                    UpstreamRequest::new(format!("/watch/providers/{}", kind.tmdb_segment()))
                        .param("language", context.language.clone())
                        .with_api_key(context.api_key.clone());
                if let Some(region) = region {
                    request.set_param("watch_region", region);
                }
                requests.push(request);
            }
        }

        let lists = join_all(requests.into_iter().map(|request| self.fetcher.fetch(request))).await;
        let mut all = Vec::new();
        for list in lists {
            let list: ProviderList = serde_json::from_value(list?)?;
            all.extend(list.results);
        }

        let merged = merge_providers(all);
        self.providers.upsert_providers(&merged).await?;
        info!(providers = merged.len(), "providers refreshed");
        Ok(merged.len())
    }

    pub async fn list_providers(&self) -> Result<Vec<ProviderRecord>> {
        self.providers.list_providers().await
    }

    pub async fn provider(&self, provider_id: i64) -> Result<Option<ProviderRecord>> {
        self.providers.get_provider(provider_id).await
    }

    pub async fn genre_names(&self, kind: MediaKind, language: &str) -> Result<Vec<String>> {
        self.genres.genre_names(kind, language).await
    }

    /// Load the genre lists for `language` unless they are already stored.
    /// Returns whether anything was fetched.
    pub async fn ensure_genres(&self, context: &CallerContext) -> Result<bool> {
        if self.genres.has_genres_for_language(&context.language).await? {
            debug!(language = %context.language, "genres already present");
            return Ok(false);
        }

        for kind in [MediaKind::Movie, MediaKind::Series] {
            let request = UpstreamRequest::new(format!("/genre/{}/list", kind.tmdb_segment()))
                .param("language", context.language.clone())
                .with_api_key(context.api_key.clone());
            let list: GenreList = serde_json::from_value(self.fetcher.fetch(request).await?)?;
            self.genres
                .insert_genres(&list.genres, kind, &context.language)
                .await?;
            info!(kind = %kind, language = %context.language, count = list.genres.len(), "genres stored");
        }

        Ok(true)
    }

    /// Genre id for a display name; lookup failures read as unknown.
    pub async fn genre_id(&self, name: &str, kind: MediaKind) -> Option<i64> {
        match self.genres.genre_id_by_name(name, kind).await {
            Ok(id) => id,
            Err(err) => {
                warn!(genre = name, "genre lookup failed: {err}");
                None
            }
        }
    }
}
