use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    database::ports::GenreRepository,
    error::Result,
    types::{GenreRecord, MediaKind},
};

#[derive(Clone, Debug)]
pub struct SqliteGenreRepository {
    pool: SqlitePool,
}

impl SqliteGenreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for SqliteGenreRepository {
    async fn insert_genres(
        &self,
        genres: &[GenreRecord],
        kind: MediaKind,
        language: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for genre in genres {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO genres (genre_id, genre_name, media_type, language)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(genre.id)
            .bind(&genre.name)
            .bind(kind.tmdb_segment())
            .bind(language)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn has_genres_for_language(&self, language: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM genres WHERE language = ? LIMIT 1",
        )
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn genre_id_by_name(&self, name: &str, kind: MediaKind) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT genre_id FROM genres WHERE genre_name = ? AND media_type = ? LIMIT 1",
        )
        .bind(name)
        .bind(kind.tmdb_segment())
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn genre_names(&self, kind: MediaKind, language: &str) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT genre_name FROM genres WHERE media_type = ? AND language = ? ORDER BY genre_name",
        )
        .bind(kind.tmdb_segment())
        .bind(language)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sqlite::SqliteCatalogStore;

    #[tokio::test]
    async fn genres_are_scoped_by_kind_and_language() {
        let store = SqliteCatalogStore::connect_in_memory().await.expect("store");
        let repo = store.genres();

        assert!(!repo.has_genres_for_language("en-US").await.expect("check"));

        let movie_genres = vec![GenreRecord {
            id: 28,
            name: "Action".into(),
        }];
        repo.insert_genres(&movie_genres, MediaKind::Movie, "en-US")
            .await
            .expect("insert");
        repo.insert_genres(&movie_genres, MediaKind::Movie, "en-US")
            .await
            .expect("insert twice");

        assert!(repo.has_genres_for_language("en-US").await.expect("check"));
        assert!(!repo.has_genres_for_language("fr-FR").await.expect("check"));
        assert_eq!(
            repo.genre_id_by_name("Action", MediaKind::Movie)
                .await
                .expect("lookup"),
            Some(28)
        );
        assert_eq!(
            repo.genre_id_by_name("Action", MediaKind::Series)
                .await
                .expect("lookup"),
            None
        );
        assert_eq!(
            repo.genre_names(MediaKind::Movie, "en-US").await.expect("names"),
            vec!["Action".to_string()]
        );
        assert!(
            repo.genre_names(MediaKind::Movie, "fr-FR")
                .await
                .expect("names")
                .is_empty()
        );
    }
}
