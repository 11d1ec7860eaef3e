//! # Streamdex Core
//!
//! Fetch, cache and paginate catalog data from the TMDB API.
//!
//! - [`dispatcher`]: the bounded-concurrency pool every upstream call runs on
//! - [`cursor`]: skip-offset to upstream-page translation backed by a memo
//! - [`cache`]: response, metadata, episode and poster caches
//! - [`enrichment`] and [`batch`]: per-title details, fetched in batches
//! - [`discover`]: multi-region catalog pages
//! - [`series`], [`lookup`], [`reference`]: episodes, metadata lookups,
//!   provider and genre tables
//! - [`database`]: repository ports and their SQLite implementations

pub mod batch;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod database;
pub mod discover;
pub mod dispatcher;
pub mod enrichment;
pub mod error;
pub mod fetch;
pub mod lookup;
pub mod reference;
pub mod series;
pub mod services;
pub mod types;
pub mod upstream;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result, UpstreamError};
pub use services::CatalogServices;
pub use types::{CallerContext, EpisodeRecord, MediaKind, MetadataRecord, ProviderRecord};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
