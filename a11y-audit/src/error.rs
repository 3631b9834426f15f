//! Error types for a11y-audit HTTP handlers
//!
//! Every failure is rendered as `{ "message": ..., "error": ... }`: a short
//! human-readable message plus the underlying cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::IngestError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Operation failed server-side (500)
    #[error("{message}: {detail}")]
    Failed { message: String, detail: String },
}

impl ApiError {
    /// Server-side failure with a user-facing message and its cause
    pub fn failed(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        ApiError::Failed {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::failed("Analysis failed", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), msg),
            ApiError::Failed { message, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, detail)
            }
        };

        let body = Json(json!({
            "message": message,
            "error": error,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditError;
    use std::time::Duration;

    #[test]
    fn test_input_error_maps_to_bad_request() {
        let err = ApiError::from(IngestError::InvalidInput("URL is required.".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pipeline_errors_map_to_server_error() {
        let errors = vec![
            IngestError::Audit(AuditError::Launch("no chrome".to_string())),
            IngestError::AuditTimeout(Duration::from_secs(1)),
            IngestError::NoResult,
            IngestError::Persistence("locked".to_string()),
        ];
        for err in errors {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("Analysis not found.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
