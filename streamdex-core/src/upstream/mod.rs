//! Access to the page-indexed upstream metadata API.

pub mod request;
pub mod tmdb;

pub use request::UpstreamRequest;
pub use tmdb::TmdbClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::UpstreamError;

/// Raw JSON transport to the upstream API.
///
/// Implementations perform exactly one HTTP call per invocation; throttling
/// is the caller's job (see [`crate::dispatcher::RequestDispatcher`]).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get_json(
        &self,
        request: &UpstreamRequest,
    ) -> Result<Value, UpstreamError>;
}
