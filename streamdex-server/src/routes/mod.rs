use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    handlers::{
        catalog_handler, health_handler, manifest_handler, meta_handler, providers_handler,
    },
};

/// Manifest, catalog, meta and provider routes plus the cached poster files.
///
/// The optional leading `{config}` segment carries the caller's settings;
/// the last segment of catalog and meta routes ends in `.json`.
pub fn create_router(state: AppState) -> Router {
    let posters = ServeDir::new(state.config.catalog.poster_dir.clone());

    Router::new()
        .route("/health", get(health_handler))
        .route("/providers", get(providers_handler))
        .route("/{config}/manifest.json", get(manifest_handler))
        .route("/catalog/{kind}/{id}", get(catalog_handler))
        .route("/catalog/{kind}/{id}/{extra}", get(catalog_handler))
        .route("/{config}/catalog/{kind}/{id}", get(catalog_handler))
        .route("/{config}/catalog/{kind}/{id}/{extra}", get(catalog_handler))
        .route("/meta/{kind}/{id}", get(meta_handler))
        .route("/{config}/meta/{kind}/{id}", get(meta_handler))
        .nest_service("/poster", posters)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
