use std::path::Path;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::infra::{app_state::AppState, config::Config};

/// Create the directories the SQLite file and the poster cache live in.
pub async fn prepare_directories(config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = config
        .database_path()
        .as_deref()
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    tokio::fs::create_dir_all(&config.catalog.poster_dir)
        .await
        .with_context(|| {
            format!("creating poster directory {}", config.catalog.poster_dir.display())
        })?;

    Ok(())
}

/// Start the cache sweeper and the one-off reference data refresh.
pub fn spawn_background_tasks(state: &AppState) -> Vec<JoinHandle<()>> {
    let sweeper = state
        .services
        .responses
        .spawn_sweeper(state.config.sweep_interval());

    let services = state.services.clone();
    let reference = tokio::spawn(async move {
        let context = services.default_context();

        match services.reference.refresh_providers(&context).await {
            Ok(count) => info!(count, "provider list refreshed"),
            Err(err) => warn!("provider refresh failed: {err}"),
        }

        match services.reference.ensure_genres(&context).await {
            Ok(true) => info!(language = %context.language, "genres fetched"),
            Ok(false) => {}
            Err(err) => warn!(language = %context.language, "genre bootstrap failed: {err}"),
        }
    });

    vec![sweeper, reference]
}
