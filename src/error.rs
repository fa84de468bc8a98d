use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::repository::RepositoryError;

/// ApiError
///
/// The single error type handlers return. Every variant carries only a fixed,
/// server-chosen message: request content is never echoed back, and internal
/// causes are logged but replaced by a generic body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400: missing or malformed input. The message names the category only.
    #[error("{0}")]
    BadRequest(&'static str),

    /// 401: no valid identity for this request.
    #[error("Not authenticated")]
    Unauthorized,

    /// 404: the named resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// 500: anything unexpected. The inner string is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            tracing::error!(%cause, "request failed");
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
