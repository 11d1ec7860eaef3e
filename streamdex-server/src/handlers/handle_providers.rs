use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::info;

use crate::{AppState, errors::AppResult};

#[derive(Debug, Serialize)]
pub struct ProviderView {
    pub id: i64,
    pub display_name: String,
    pub logo_path: Option<String>,
}

pub async fn providers_handler(State(state): State<AppState>) -> AppResult<Json<Vec<ProviderView>>> {
    let providers = state.services.reference.list_providers().await?;
    info!(count = providers.len(), "listing providers");

    Ok(Json(
        providers
            .into_iter()
            .map(|provider| ProviderView {
                id: provider.provider_id,
                display_name: provider.provider_name,
                logo_path: provider.logo_path,
            })
            .collect(),
    ))
}
