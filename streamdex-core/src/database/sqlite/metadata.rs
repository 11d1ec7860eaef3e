use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    database::ports::MetadataRepository,
    error::Result,
    types::{MediaKind, MetadataRecord, TrailerRef, join_names, split_names},
};

#[derive(Clone, Debug)]
pub struct SqliteMetadataRepository {
    pool: SqlitePool,
}

impl SqliteMetadataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MetadataRow {
    id: i64,
    media_type: String,
    title: Option<String>,
    original_title: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    popularity: Option<f64>,
    vote_average: Option<f64>,
    vote_count: Option<i64>,
    original_language: Option<String>,
    genres: Option<String>,
    runtime: Option<String>,
    provider_id: Option<i64>,
    budget: Option<i64>,
    revenue: Option<i64>,
    homepage: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    tagline: Option<String>,
    status: Option<String>,
    belongs_to_collection: Option<String>,
    production_companies: Option<String>,
    production_countries: Option<String>,
    spoken_languages: Option<String>,
    video_key: Option<String>,
    video_name: Option<String>,
    video_published_at: Option<String>,
    directors: Option<String>,
    writers: Option<String>,
    main_cast: Option<String>,
    imdb_id: Option<String>,
}

impl MetadataRow {
    fn into_record(self) -> Result<MetadataRecord> {
        let media_kind = self.media_type.parse::<MediaKind>()?;
        let trailer = self.video_key.map(|key| TrailerRef {
            key,
            name: self.video_name,
            published_at: self.video_published_at,
        });

        Ok(MetadataRecord {
            id: self.id,
            media_kind,
            title: self.title,
            original_title: self.original_title,
            overview: self.overview,
            release_date: self.release_date,
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            original_language: self.original_language,
            genres: split_names(self.genres.as_deref()),
            runtime: self.runtime,
            provider_id: self.provider_id,
            budget: self.budget,
            revenue: self.revenue,
            homepage: self.homepage,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            tagline: self.tagline,
            status: self.status,
            belongs_to_collection: self.belongs_to_collection,
            production_companies: split_names(self.production_companies.as_deref()),
            production_countries: split_names(self.production_countries.as_deref()),
            spoken_languages: split_names(self.spoken_languages.as_deref()),
            trailer,
            directors: split_names(self.directors.as_deref()),
            writers: split_names(self.writers.as_deref()),
            main_cast: split_names(self.main_cast.as_deref()),
            imdb_id: self.imdb_id,
        })
    }
}

#[async_trait]
impl MetadataRepository for SqliteMetadataRepository {
    async fn get_metadata(&self, id: i64, kind: MediaKind) -> Result<Option<MetadataRecord>> {
        let row = sqlx::query_as::<_, MetadataRow>(
            "SELECT * FROM metadata WHERE id = ? AND media_type = ?",
        )
        .bind(id)
        .bind(kind.tmdb_segment())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MetadataRow::into_record).transpose()
    }

    async fn upsert_metadata(&self, record: &MetadataRecord) -> Result<()> {
        let trailer = record.trailer.as_ref();

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO metadata (
                id, media_type, title, original_title, overview, release_date,
                popularity, vote_average, vote_count, original_language, genres,
                runtime, provider_id, budget, revenue, homepage, poster_path,
                backdrop_path, tagline, status, belongs_to_collection,
                production_companies, production_countries, spoken_languages,
                video_key, video_name, video_published_at, directors, writers,
                main_cast, imdb_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(record.media_kind.tmdb_segment())
        .bind(&record.title)
        .bind(&record.original_title)
        .bind(&record.overview)
        .bind(&record.release_date)
        .bind(record.popularity)
        .bind(record.vote_average)
        .bind(record.vote_count)
        .bind(&record.original_language)
        .bind(join_names(&record.genres))
        .bind(&record.runtime)
        .bind(record.provider_id)
        .bind(record.budget)
        .bind(record.revenue)
        .bind(&record.homepage)
        .bind(&record.poster_path)
        .bind(&record.backdrop_path)
        .bind(&record.tagline)
        .bind(&record.status)
        .bind(&record.belongs_to_collection)
        .bind(join_names(&record.production_companies))
        .bind(join_names(&record.production_countries))
        .bind(join_names(&record.spoken_languages))
        .bind(trailer.map(|t| t.key.clone()))
        .bind(trailer.and_then(|t| t.name.clone()))
        .bind(trailer.and_then(|t| t.published_at.clone()))
        .bind(join_names(&record.directors))
        .bind(join_names(&record.writers))
        .bind(join_names(&record.main_cast))
        .bind(&record.imdb_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
