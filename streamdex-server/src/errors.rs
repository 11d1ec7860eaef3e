use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use streamdex_core::{CatalogError, UpstreamError};
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure returned by a route, rendered as
/// `{ "error": { "message", "status" } }`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// The caller sent a catalog id, type or config we cannot serve.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let (status, message) = match err {
            CatalogError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            CatalogError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CatalogError::Upstream(UpstreamError::RateLimited) => (
                StatusCode::TOO_MANY_REQUESTS,
                "upstream rate limit reached".to_string(),
            ),
            other => {
                error!("request failed: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };
        Self { status, message }
    }
}
