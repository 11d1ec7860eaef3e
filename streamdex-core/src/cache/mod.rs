//! Cache tiers in front of the upstream API.
//!
//! Reads degrade to a miss on storage errors. Writes never fail the caller:
//! a failed write is logged and published on the [`WriteFailureReporter`]
//! channel for whoever subscribed.

pub mod episodes;
pub mod metadata;
pub mod poster;
pub mod response;

pub use episodes::EpisodeCache;
pub use metadata::MetadataCache;
pub use poster::PosterCache;
pub use response::{PageMemo, ResponseCache};

use std::{borrow::Cow, fmt};

use tokio::sync::broadcast;
use tracing::warn;
use url::Url;

const SECRET_PARAMS: &[&str] = &["api_key"];

/// Cache key as it may appear in logs: URL keys lose their credential
/// query pairs, other keys pass through.
pub fn redact_key(key: &str) -> Cow<'_, str> {
    let Ok(mut url) = Url::parse(key) else {
        return Cow::Borrowed(key);
    };
    if !url.query_pairs().any(|(name, _)| SECRET_PARAMS.contains(&name.as_ref())) {
        return Cow::Borrowed(key);
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !SECRET_PARAMS.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Cow::Owned(url.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Response,
    Metadata,
    Episode,
    Poster,
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheTier::Response => "response",
            CacheTier::Metadata => "metadata",
            CacheTier::Episode => "episode",
            CacheTier::Poster => "poster",
        };
        f.write_str(name)
    }
}

/// A cache write that did not land. `key` is already redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWriteFailure {
    pub tier: CacheTier,
    pub key: String,
    pub message: String,
}

/// Out-of-band sink for failed cache writes.
#[derive(Debug, Clone)]
pub struct WriteFailureReporter {
    tx: broadcast::Sender<CacheWriteFailure>,
}

impl Default for WriteFailureReporter {
    fn default() -> Self {
        Self::new(64)
    }
}

impl WriteFailureReporter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheWriteFailure> {
        self.tx.subscribe()
    }

    pub fn report(&self, tier: CacheTier, key: impl AsRef<str>, error: &dyn fmt::Display) {
        let failure = CacheWriteFailure {
            tier,
            key: redact_key(key.as_ref()).into_owned(),
            message: error.to_string(),
        };
        warn!(tier = %failure.tier, key = %failure.key, "cache write failed: {}", failure.message);
        // No subscribers is fine; the warning above is the record.
        let _ = self.tx.send(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_reported_failures() {
        let reporter = WriteFailureReporter::new(4);
        let mut rx = reporter.subscribe();

        reporter.report(CacheTier::Metadata, "movie:603", &"disk full");

        let failure = rx.recv().await.expect("failure");
        assert_eq!(failure.tier, CacheTier::Metadata);
        assert_eq!(failure.key, "movie:603");
        assert_eq!(failure.message, "disk full");
    }

    #[tokio::test]
    async fn reported_keys_never_carry_api_keys() {
        let reporter = WriteFailureReporter::new(4);
        let mut rx = reporter.subscribe();

        reporter.report(
            CacheTier::Response,
            "https://api.themoviedb.org/3/discover/movie?page=2&api_key=s3cret",
            &"database is locked",
        );

        let failure = rx.recv().await.expect("failure");
        assert!(!failure.key.contains("api_key"));
        assert!(!failure.key.contains("s3cret"));
        assert_eq!(failure.key, "https://api.themoviedb.org/3/discover/movie?page=2");
    }

    #[test]
    fn redaction_strips_only_credentials() {
        assert_eq!(
            redact_key("https://api.example.test/3/movie/603?language=en-US&api_key=k&append_to_response=videos"),
            "https://api.example.test/3/movie/603?language=en-US&append_to_response=videos"
        );
        assert_eq!(
            redact_key("https://api.example.test/3/genre/tv/list?api_key=k"),
            "https://api.example.test/3/genre/tv/list"
        );
        assert!(matches!(
            redact_key("https://api.example.test/3/tv/1399?language=fr-FR"),
            Cow::Borrowed(_)
        ));
        assert_eq!(redact_key("movie:603"), "movie:603");
    }

    #[test]
    fn reporting_without_subscribers_is_silent() {
        WriteFailureReporter::default().report(CacheTier::Poster, "poster:1", &"nope");
    }
}
