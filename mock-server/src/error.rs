use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures surfaced to API callers as `{"message": ...}` bodies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PreconditionFailed(String),
}

impl MarketError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MarketError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MarketError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::Conflict(_) => StatusCode::CONFLICT,
            MarketError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, message = %self, "rejecting request");
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}
