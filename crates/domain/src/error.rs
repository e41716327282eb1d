use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;

/// Errors surfaced by the request handlers
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required request field was missing or unusable
    #[error("{0}")]
    Validation(String),

    /// Any failure from the upstream API call chain
    #[error("{0}")]
    Upstream(String),

    /// Local failure after upstream data was gathered, e.g. rendering the workbook
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body returned by every JSON route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            Self::Validation(message) => tracing::warn!(%message, "rejected request"),
            Self::Upstream(message) => tracing::error!(%message, "upstream request failed"),
            Self::Internal(message) => tracing::error!(%message, "request failed"),
        }

        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
