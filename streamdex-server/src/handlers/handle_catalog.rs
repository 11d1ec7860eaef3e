use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
};
use futures::future::join_all;
use serde::Serialize;
use streamdex_core::discover::DiscoverQuery;
use tracing::{debug, info, warn};

use crate::{
    AppState,
    errors::{AppError, AppResult},
    presentation::{
        params::{CatalogExtra, CatalogId, ClientConfig},
        posters::{PosterOptions, resolve_poster, store_posters},
        preview::{DiscoverItem, MetaPreview, build_preview},
    },
};

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

/// `/{config}/catalog/{kind}/{id}/{extra}.json` and its shorter forms.
pub async fn catalog_handler(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> AppResult<Json<CatalogResponse>> {
    let raw_id = params.get("id").map(String::as_str).unwrap_or_default();
    let catalog = CatalogId::parse(raw_id)
        .ok_or_else(|| AppError::bad_request(format!("Invalid catalog id: {raw_id}")))?;
    let extra = CatalogExtra::parse(params.get("extra").map(String::as_str));
    let client = ClientConfig::parse(params.get("config").map(String::as_str));

    let services = &state.services;
    let context = client.context(&services.config.language);
    let kind = catalog.kind;

    debug!(
        kind = %kind,
        provider_id = catalog.provider_id,
        skip = extra.skip,
        genre = ?extra.genre,
        "catalog request"
    );

    let genre_id = match extra.genre.as_deref() {
        Some(name) => {
            if let Err(err) = services.reference.ensure_genres(&context).await {
                warn!(language = %context.language, "genre bootstrap failed: {err}");
            }
            let id = services.reference.genre_id(name, kind).await;
            if id.is_none() {
                warn!(genre = name, "unknown genre, listing without genre filter");
            }
            id
        }
        None => None,
    };

    let query = DiscoverQuery {
        kind,
        provider_ids: vec![catalog.provider_id],
        sort_by: catalog.sort_by().to_string(),
        genre_id,
        age_range: client.age_range.clone(),
        skip: extra.skip,
        context,
    };
    let page = services.discover.discover(&query).await?;

    let options = PosterOptions {
        kind,
        language: &query.context.language,
        rpdb_key: client.rpdb_api_key.as_deref(),
    };
    let items: Vec<DiscoverItem> = page.results.iter().filter_map(DiscoverItem::from_value).collect();

    let built = join_all(items.into_iter().map(|item| async move {
        let poster_path = item.poster_path.clone().unwrap_or_default();
        let poster = resolve_poster(&services.posters, options, item.id, &poster_path).await;
        let metadata = services.metadata.get(item.id, kind).await;
        (
            build_preview(item, kind, poster.url, metadata.as_ref()),
            poster.pending,
        )
    }))
    .await;

    let mut metas = Vec::with_capacity(built.len());
    let mut pending = Vec::new();
    for (preview, poster) in built {
        metas.push(preview);
        pending.extend(poster);
    }

    if !pending.is_empty() {
        tokio::spawn(store_posters(services.posters.clone(), pending));
    }

    info!(kind = %kind, provider_id = catalog.provider_id, skip = extra.skip, metas = metas.len(), "catalog served");
    Ok(Json(CatalogResponse { metas }))
}
