use streamdex_core::{MediaKind, cache::PosterCache};
use tracing::{debug, error, info};

use super::tmdb_image;

pub const POSTER_SIZE: &str = "w500";

/// Rating poster for a title. Keys of the `t0`/`t1` tiers cannot pick a
/// language.
pub fn rpdb_poster_url(kind: MediaKind, id: i64, language: &str, rpdb_key: &str) -> String {
    let tier = rpdb_key.split('-').next().unwrap_or_default();
    let base = format!(
        "https://api.ratingposterdb.com/{rpdb_key}/tmdb/poster-default/{}-{id}.jpg?fallback=true",
        kind.as_str()
    );

    if matches!(tier, "t0" | "t1") {
        base
    } else {
        let lang = language.split('-').next().unwrap_or(language);
        format!("{base}&lang={lang}")
    }
}

/// Rating poster worth copying into the poster cache once the response is
/// out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPoster {
    pub poster_id: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPoster {
    pub url: String,
    pub pending: Option<PendingPoster>,
}

#[derive(Debug, Clone, Copy)]
pub struct PosterOptions<'a> {
    pub kind: MediaKind,
    pub language: &'a str,
    pub rpdb_key: Option<&'a str>,
}

/// Cached rating poster, then a live rating poster, then the TMDB image.
pub async fn resolve_poster(
    cache: &PosterCache,
    options: PosterOptions<'_>,
    id: i64,
    poster_path: &str,
) -> ResolvedPoster {
    let fallback = ResolvedPoster {
        url: tmdb_image(POSTER_SIZE, poster_path),
        pending: None,
    };
    let Some(rpdb_key) = options.rpdb_key else {
        return fallback;
    };

    let poster_id = format!("poster:{id}");
    if let Some(url) = cache.cached_url(&poster_id).await {
        return ResolvedPoster { url, pending: None };
    }

    let rpdb = rpdb_poster_url(options.kind, id, options.language, rpdb_key);
    if cache.probe(&rpdb).await {
        ResolvedPoster {
            url: rpdb.clone(),
            pending: Some(PendingPoster {
                poster_id,
                source_url: rpdb,
            }),
        }
    } else {
        debug!(id, "rating poster unavailable, using TMDB poster");
        fallback
    }
}

/// Download each pending poster into the cache, one after another.
pub async fn store_posters(cache: PosterCache, pending: Vec<PendingPoster>) {
    let total = pending.len();
    let mut stored = 0;
    for poster in pending {
        match cache.store(&poster.poster_id, &poster.source_url).await {
            Ok(()) => stored += 1,
            Err(err) => error!(poster_id = %poster.poster_id, "failed to cache poster: {err}"),
        }
    }
    info!(stored, total, "posters cached");
}
