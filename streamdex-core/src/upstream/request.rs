use url::Url;

use crate::error::UpstreamError;

/// A single GET against the upstream API: path, ordered query parameters and
/// an optional per-caller API key.
///
/// The fully qualified URL doubles as the response cache key, so parameter
/// order is preserved as inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    path: String,
    params: Vec<(String, String)>,
    api_key: Option<String>,
}

impl UpstreamRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            api_key: None,
        }
    }

    pub fn param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set_param(key, value);
        self
    }

    /// Insert or replace a parameter, keeping its original position.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.is_empty());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn url(&self, base_url: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            self.path
        ))
        .map_err(|e| UpstreamError::ParseError(format!("invalid upstream URL: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.params {
                query.append_pair(key, value);
            }
            if let Some(api_key) = &self.api_key {
                query.append_pair("api_key", api_key);
            }
        }

        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// Key under which the response is cached.
    pub fn cache_key(&self, base_url: &str) -> Result<String, UpstreamError> {
        self.url(base_url).map(String::from)
    }
}
