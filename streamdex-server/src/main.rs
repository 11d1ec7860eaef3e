//! # streamdex server
//!
//! Serves provider catalogs enriched with TMDB metadata.
//!
//! Startup order: configuration (env, `.env`, CLI overrides), tracing, the
//! SQLite store and its migrations, the catalog services, background tasks,
//! then the HTTP listener.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use streamdex_core::{CatalogServices, database::sqlite::SqliteCatalogStore, upstream::TmdbClient};
use streamdex_server::{
    AppState,
    infra::{config::Config, startup},
    routes,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "streamdex-server")]
#[command(about = "Catalog and metadata service backed by TMDB")]
struct Cli {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// SQLite database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // clap reads env defaults, so .env has to be loaded first
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "streamdex_core=info,streamdex_server=info,tower_http=info".into()
        }))
        .with(fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    startup::prepare_directories(&config).await?;

    let store = SqliteCatalogStore::connect(&config.database_url)
        .await
        .with_context(|| format!("opening catalog database {}", config.database_url))?;
    let upstream = Arc::new(TmdbClient::new(&config.catalog).context("building TMDB client")?);
    if config.catalog.tmdb_bearer_token.is_none() {
        warn!("TMDB_BEARER_TOKEN is unset; only callers with their own API key will get results");
    }

    let services = CatalogServices::build(config.catalog.clone(), store, upstream)
        .context("wiring catalog services")?;

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| {
            format!("invalid listen address {}:{}", config.server_host, config.server_port)
        })?;

    let state = AppState::new(config, services);
    let _background = startup::spawn_background_tasks(&state);
    let router = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("streamdex listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}
