//! API error type, rendered as `{"detail": "..."}` JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// A GOG request on our behalf failed.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<gogshelf_store::StoreError> for ApiError {
    fn from(e: gogshelf_store::StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<gogshelf_scan::FlowError> for ApiError {
    fn from(e: gogshelf_scan::FlowError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
