use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{CatalogError, Result, UpstreamError},
};

/// File-backed poster images, served back under `{public_base_url}/poster/`.
///
/// A poster is fresh while its file's modification time is within the TTL.
#[derive(Clone, Debug)]
pub struct PosterCache {
    root: PathBuf,
    ttl: Duration,
    public_base_url: String,
    http: reqwest::Client,
}

impl PosterCache {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(UpstreamError::from)?;

        Ok(Self {
            root: config.poster_dir.clone(),
            ttl: config.poster_ttl(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Map a poster id onto a safe file stem.
    pub fn file_stem(poster_id: &str) -> String {
        poster_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    pub fn path_for(&self, poster_id: &str) -> PathBuf {
        self.root.join(format!("{}.jpg", Self::file_stem(poster_id)))
    }

    pub fn public_url(&self, poster_id: &str) -> String {
        format!(
            "{}/poster/{}.jpg",
            self.public_base_url,
            Self::file_stem(poster_id)
        )
    }

    /// Public URL of the cached poster, if present and fresh.
    pub async fn cached_url(&self, poster_id: &str) -> Option<String> {
        let path = self.path_for(poster_id);
        let modified = tokio::fs::metadata(&path).await.ok()?.modified().ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age < self.ttl {
            debug!(poster_id, "poster cache hit");
            Some(self.public_url(poster_id))
        } else {
            debug!(poster_id, "poster cache expired");
            None
        }
    }

    /// True when `url` answers a HEAD request with 200.
    pub async fn probe(&self, url: &str) -> bool {
        match self.http.head(url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(err) => {
                debug!("poster probe failed: {err}");
                false
            }
        }
    }

    /// Download `source_url` and store it under `poster_id`.
    pub async fn store(&self, poster_id: &str, source_url: &str) -> Result<()> {
        let response = self
            .http
            .get(source_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| UpstreamError::from(err.without_url()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::from(err.without_url()))?;

        self.store_bytes(poster_id, &bytes).await
    }

    /// Write the poster through a temp file and rename it into place.
    pub async fn store_bytes(&self, poster_id: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            CatalogError::Internal(format!(
                "failed to create poster dir {:?}: {err}",
                self.root
            ))
        })?;

        let path = self.path_for(poster_id);
        let tmp = self.root.join(format!(
            "{}.tmp-{}",
            Self::file_stem(poster_id),
            Uuid::new_v4().simple()
        ));

        if let Err(err) = write_then_rename(&tmp, &path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CatalogError::Internal(format!(
                "failed to store poster {:?}: {err}",
                path
            )));
        }

        debug!(poster_id, path = ?path, "poster cached");
        Ok(())
    }
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);
    tokio::fs::rename(tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_in(dir: &Path, ttl_days: u32) -> PosterCache {
        let config = CatalogConfig {
            poster_dir: dir.to_path_buf(),
            poster_ttl_days: ttl_days,
            public_base_url: "http://localhost:7000/".into(),
            ..CatalogConfig::default()
        };
        PosterCache::new(&config).expect("poster cache")
    }

    #[test]
    fn ids_are_sanitized_for_the_filesystem() {
        assert_eq!(PosterCache::file_stem("poster:603"), "poster_603");
        assert_eq!(PosterCache::file_stem("a/b..c-d_e"), "a_b__c-d_e");
    }

    #[tokio::test]
    async fn stored_poster_is_served_from_public_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(dir.path(), 3);

        assert_eq!(cache.cached_url("poster:603").await, None);

        cache
            .store_bytes("poster:603", b"\xFF\xD8\xFFjpeg")
            .await
            .expect("store");

        assert_eq!(
            cache.cached_url("poster:603").await.as_deref(),
            Some("http://localhost:7000/poster/poster_603.jpg")
        );
        let written = tokio::fs::read(dir.path().join("poster_603.jpg"))
            .await
            .expect("read back");
        assert_eq!(written, b"\xFF\xD8\xFFjpeg");
    }

    #[tokio::test]
    async fn zero_ttl_never_serves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(dir.path(), 0);

        cache.store_bytes("poster:1", b"x").await.expect("store");

        assert_eq!(cache.cached_url("poster:1").await, None);
    }

    #[tokio::test]
    async fn failed_store_removes_its_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(dir.path(), 3);
        let blocker = dir.path().join("poster_4.jpg");
        tokio::fs::create_dir(&blocker).await.expect("blocker dir");
        tokio::fs::write(blocker.join("keep"), b"x").await.expect("blocker file");

        assert!(cache.store_bytes("poster:4", b"four").await.is_err());

        let mut entries = tokio::fs::read_dir(dir.path()).await.expect("read dir");
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.expect("entry") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["poster_4.jpg".to_string()]);
    }

    #[tokio::test]
    async fn no_temp_files_are_left_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(dir.path(), 3);

        cache.store_bytes("poster:2", b"one").await.expect("first");
        cache.store_bytes("poster:2", b"two").await.expect("second");

        let mut entries = tokio::fs::read_dir(dir.path()).await.expect("read dir");
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.expect("entry") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["poster_2.jpg".to_string()]);
    }
}
