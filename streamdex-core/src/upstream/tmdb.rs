use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use super::{Upstream, UpstreamRequest};
use crate::{config::CatalogConfig, error::UpstreamError};

/// HTTP transport to the TMDB v3 API.
///
/// Requests carrying a caller API key authenticate with it as a query
/// parameter; everything else uses the configured bearer token.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TmdbClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.tmdb_base_url.clone(),
            bearer_token: config.tmdb_bearer_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Upstream for TmdbClient {
    async fn get_json(
        &self,
        request: &UpstreamRequest,
    ) -> Result<Value, UpstreamError> {
        let url = request.url(&self.base_url)?;

        let mut builder = self.http.get(url);
        if request.api_key().is_none() {
            if let Some(token) = &self.bearer_token {
                builder = builder.bearer_auth(token);
            }
        }

        // reqwest errors carry the full URL, api_key included.
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            error!(path = request.path(), "upstream request failed: {e}");
            UpstreamError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(path = request.path(), "upstream request succeeded");
            return response
                .json::<Value>()
                .await
                .map_err(|e| UpstreamError::from(e.without_url()));
        }

        #[derive(Debug, Deserialize)]
        struct TmdbErrorBody {
            #[serde(default)]
            status_message: Option<String>,
        }

        let message = response
            .json::<TmdbErrorBody>()
            .await
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| {
                format!("TMDB request failed with status {}", status)
            });

        error!(path = request.path(), status = status.as_u16(), "upstream rejected request: {message}");

        match status.as_u16() {
            401 => Err(UpstreamError::InvalidApiKey),
            404 => Err(UpstreamError::NotFound),
            429 => Err(UpstreamError::RateLimited),
            _ => Err(UpstreamError::ApiError(message)),
        }
    }
}
