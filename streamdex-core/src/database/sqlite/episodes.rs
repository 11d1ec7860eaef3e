use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{database::ports::EpisodeRepository, error::Result, types::EpisodeRecord};

#[derive(Clone, Debug)]
pub struct SqliteEpisodeRepository {
    pool: SqlitePool,
}

impl SqliteEpisodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EpisodeRepository for SqliteEpisodeRepository {
    async fn episodes_for_show(&self, show_id: i64) -> Result<Vec<EpisodeRecord>> {
        let rows = sqlx::query_as::<_, EpisodeRecord>(
            r#"
            SELECT id, show_id, season_number, episode_number, air_date, name,
                   overview, production_code, runtime, still_path, vote_average,
                   vote_count
            FROM episodes
            WHERE show_id = ?
            ORDER BY season_number, episode_number
            "#,
        )
        .bind(show_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_episode(&self, episode: &EpisodeRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO episodes (
                id, show_id, season_number, episode_number, air_date, name,
                overview, production_code, runtime, still_path, vote_average,
                vote_count
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(episode.id)
        .bind(episode.show_id)
        .bind(episode.season_number)
        .bind(episode.episode_number)
        .bind(&episode.air_date)
        .bind(&episode.name)
        .bind(&episode.overview)
        .bind(&episode.production_code)
        .bind(episode.runtime)
        .bind(&episode.still_path)
        .bind(episode.vote_average)
        .bind(episode.vote_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
