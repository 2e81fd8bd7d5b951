use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// API-facing error type for the HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] retire_core::EngineError),

    #[error("request validation failed: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("simulation task panicked")]
    TaskJoin,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::InvalidScenario(_) | ApiError::ValidationError { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::TaskJoin => {
                tracing::error!(error = %self, "simulation worker task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
