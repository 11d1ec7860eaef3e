use async_trait::async_trait;

use crate::{
    error::Result,
    types::{GenreRecord, MediaKind},
};

#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Insert genres for a language, ignoring ones already stored.
    async fn insert_genres(
        &self,
        genres: &[GenreRecord],
        kind: MediaKind,
        language: &str,
    ) -> Result<()>;

    async fn has_genres_for_language(&self, language: &str) -> Result<bool>;

    async fn genre_id_by_name(&self, name: &str, kind: MediaKind) -> Result<Option<i64>>;

    /// Genre names stored for a kind and language, sorted by name.
    async fn genre_names(&self, kind: MediaKind, language: &str) -> Result<Vec<String>>;
}
