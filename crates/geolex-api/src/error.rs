//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps pipeline and validation errors to HTTP status codes with JSON
//! error bodies. Never exposes internal error details (prompts, service
//! URLs, raw model text) in responses — those go to the logs only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use geolex_pipeline::PipelineError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface. The `details` field carries additional context for client
/// errors but is omitted for 500-class errors to prevent leakage.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "INVALID_FEATURE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request is missing fields or carries empty values (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The validator rejected the submission as not a feature (400).
    #[error("input does not appear to be a meaningful feature")]
    InvalidFeature,

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// A required service dependency is not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::InvalidFeature => (StatusCode::BAD_REQUEST, "INVALID_FEATURE"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Log server-side errors for operator visibility.
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Collapse pipeline failures into the two status classes the API
/// exposes: the caller's fault (400) or a service fault (500). The
/// specific server-side cause stays in the log line, not the response.
impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(e) => Self::BadRequest(e.to_string()),
            PipelineError::InvalidFeature => Self::InvalidFeature,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<geolex_core::ValidationError> for AppError {
    fn from(err: geolex_core::ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolex_rag::JudgmentError;

    #[test]
    fn bad_request_status_code() {
        let err = AppError::BadRequest("missing title".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn invalid_feature_status_code() {
        let (status, code) = AppError::InvalidFeature.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_FEATURE");
    }

    #[test]
    fn internal_status_code() {
        let err = AppError::Internal("judge exploded".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }

    #[test]
    fn pipeline_client_errors_map_to_400() {
        let err: AppError = PipelineError::InvalidFeature.into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);

        let err: AppError =
            PipelineError::InvalidInput(geolex_core::ValidationError::EmptyTitle).into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn pipeline_server_errors_map_to_500() {
        for err in [
            PipelineError::EmptyEmbedding,
            PipelineError::MissingComplianceMap,
            PipelineError::MalformedJudgment {
                raw: "prose".to_string(),
            },
            PipelineError::Judgment(JudgmentError::EmptyResponse {
                endpoint: "x".to_string(),
            }),
        ] {
            let app_err: AppError = err.into();
            assert_eq!(
                app_err.status_and_code().0,
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn error_body_serializes_without_empty_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "INVALID_FEATURE".to_string(),
                message: "nope".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("INVALID_FEATURE"));
        assert!(!json.contains("details"));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_bad_request_keeps_message() {
        let (status, body) =
            response_parts(AppError::BadRequest("missing description".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.message.contains("missing description"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("judgment service unavailable: …".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(body.error.details.is_none());
    }
}
