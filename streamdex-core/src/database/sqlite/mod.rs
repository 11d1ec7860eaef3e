//! SQLite-backed repositories.
//!
//! All writes are single insert-or-replace / insert-or-ignore statements; no
//! transaction spans more than one table.

mod cache;
mod episodes;
mod genres;
mod metadata;
mod providers;

pub use cache::SqliteCacheRepository;
pub use episodes::SqliteEpisodeRepository;
pub use genres::SqliteGenreRepository;
pub use metadata::SqliteMetadataRepository;
pub use providers::SqliteProviderRepository;

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::info;

use crate::{MIGRATOR, error::Result};

#[derive(Clone, Debug)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    /// Open (creating if needed) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Opening catalog store at {}", url);

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database; a single connection keeps every query on
    /// the same database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn cache(&self) -> SqliteCacheRepository {
        SqliteCacheRepository::new(self.pool.clone())
    }

    pub fn metadata(&self) -> SqliteMetadataRepository {
        SqliteMetadataRepository::new(self.pool.clone())
    }

    pub fn episodes(&self) -> SqliteEpisodeRepository {
        SqliteEpisodeRepository::new(self.pool.clone())
    }

    pub fn providers(&self) -> SqliteProviderRepository {
        SqliteProviderRepository::new(self.pool.clone())
    }

    pub fn genres(&self) -> SqliteGenreRepository {
        SqliteGenreRepository::new(self.pool.clone())
    }
}
