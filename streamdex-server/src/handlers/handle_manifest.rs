use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
};
use futures::future::try_join_all;
use streamdex_core::MediaKind;
use tracing::{debug, info, warn};

use crate::{
    AppState,
    errors::{AppError, AppResult},
    presentation::{
        manifest::{GenreOptions, Manifest, advertised_age_range, build_manifest},
        params::ClientConfig,
    },
};

/// `/{config}/manifest.json`: catalogs for the providers selected in the
/// config, with genre filters in the configured language.
pub async fn manifest_handler(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> AppResult<Json<Manifest>> {
    let client = ClientConfig::parse(params.get("config").map(String::as_str));
    if client.providers.is_empty() {
        return Err(AppError::bad_request("No providers specified."));
    }

    let reference = &state.services.reference;
    let context = client.context(&state.services.config.language);

    if let Err(err) = reference.ensure_genres(&context).await {
        warn!(language = %context.language, "genre bootstrap failed: {err}");
    }
    let genres = GenreOptions {
        movie: reference.genre_names(MediaKind::Movie, &context.language).await?,
        series: reference.genre_names(MediaKind::Series, &context.language).await?,
    };

    let providers = try_join_all(client.providers.iter().map(|&id| reference.provider(id)))
        .await?
        .into_iter()
        .zip(&client.providers)
        .filter_map(|(provider, id)| {
            if provider.is_none() {
                debug!(provider_id = id, "unknown provider left out of manifest");
            }
            provider
        })
        .collect::<Vec<_>>();

    let manifest = build_manifest(
        &providers,
        &genres,
        advertised_age_range(client.age_range.as_deref()),
    );
    info!(
        providers = providers.len(),
        catalogs = manifest.catalogs.len(),
        language = %context.language,
        "manifest served"
    );
    Ok(Json(manifest))
}
