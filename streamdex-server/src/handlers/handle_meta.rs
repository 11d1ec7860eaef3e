use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};
use streamdex_core::MediaKind;
use tracing::info;

use crate::{
    AppState,
    errors::AppResult,
    presentation::{
        meta::build_meta,
        params::{ClientConfig, strip_json},
    },
};

/// `{ "meta": {...} }`, or `{ "meta": {} }` for titles no catalog has
/// listed yet.
pub async fn meta_handler(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> AppResult<Json<Value>> {
    let kind: MediaKind = params
        .get("kind")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;
    let id = strip_json(params.get("id").map(String::as_str).unwrap_or_default());
    let client = ClientConfig::parse(params.get("config").map(String::as_str));
    let context = client.context(&state.services.config.language);

    info!(kind = %kind, id, "meta request");

    let meta = match state.services.lookup.lookup(kind, id, &context).await {
        Some(title) => json!({ "meta": build_meta(&title) }),
        None => json!({ "meta": {} }),
    };
    Ok(Json(meta))
}
