//! API Error Types
//!
//! Error types for the HTTP layer and their mapping to status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::format::ShapeError;
use crate::influx::InfluxError;
use crate::query::QueryError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database selector header absent or blank
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Body could not be decoded
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Validation or compilation failure
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Store failure
    #[error("InfluxDB error: {0}")]
    Influx(#[from] InfluxError),

    /// Results could not be reshaped
    #[error("Format error: {0}")]
    Shape(#[from] ShapeError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingHeader(_) => (StatusCode::BAD_REQUEST, "MISSING_HEADER"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Query(QueryError::Validation(_)) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Query(QueryError::Compile(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "COMPILE_ERROR"),
            ApiError::Influx(e) => match e {
                InfluxError::Query(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                InfluxError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                InfluxError::Connection(_) => (StatusCode::BAD_GATEWAY, "CONNECTION_ERROR"),
                InfluxError::NullResponse => (StatusCode::BAD_GATEWAY, "NULL_RESPONSE"),
                InfluxError::Store(_) | InfluxError::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR")
                }
            },
            ApiError::Shape(_) => (StatusCode::INTERNAL_SERVER_ERROR, "FORMAT_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{InvalidReason, ValidationError};

    fn status(e: impl Into<ApiError>) -> StatusCode {
        e.into().status_and_code().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(ApiError::MissingHeader("X-UserId".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(QueryError::Validation(ValidationError {
                index: 0,
                reason: InvalidReason::NoColumns
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(InfluxError::NotFound("database not found: x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(InfluxError::Connection("refused".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status(InfluxError::NullResponse), StatusCode::BAD_GATEWAY);
        assert_eq!(status(InfluxError::Store("boom".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(ShapeError::MultipleSeries { statement: 0, found: 2 }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::MissingHeader("X-UserId".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "MISSING_HEADER");
        assert!(body["error"]["message"].as_str().unwrap().contains("X-UserId"));
        assert!(body["request_id"].is_string());
    }
}
