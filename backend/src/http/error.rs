//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::{FieldErrors, ServiceError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub detail: String,
    /// Per-field messages for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Body or query string could not be decoded.
    BadRequest(String),
    Service(ServiceError),
}

impl AppError {
    /// Status code and body for this error.
    pub fn parts(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("parse_error", msg)),
            AppError::Service(err) => service_parts(err),
        }
    }
}

fn service_parts(err: &ServiceError) -> (StatusCode, ApiError) {
    match err {
        ServiceError::Unauthenticated(msg) => (
            StatusCode::UNAUTHORIZED,
            ApiError::new("not_authenticated", msg),
        ),
        ServiceError::Unauthorized(msg) => {
            (StatusCode::UNAUTHORIZED, ApiError::new("unauthorized", msg))
        }
        ServiceError::Forbidden(msg) => {
            (StatusCode::FORBIDDEN, ApiError::new("permission_denied", msg))
        }
        ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("not_found", msg)),
        ServiceError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            ApiError::new("invalid", err.to_string()).with_errors(errors.clone()),
        ),
        ServiceError::Conflict(msg) => (StatusCode::BAD_REQUEST, ApiError::new("conflict", msg)),
        ServiceError::Internal(msg) => {
            tracing::error!("internal error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("internal_error", "A server error occurred."),
            )
        }
        ServiceError::Repository(e) => repository_parts(e),
    }
}

fn repository_parts(err: &RepositoryError) -> (StatusCode, ApiError) {
    match err {
        RepositoryError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, ApiError::new("not_found", "Not found."))
        }
        RepositoryError::Conflict { message, .. } => {
            (StatusCode::BAD_REQUEST, ApiError::new("conflict", message))
        }
        RepositoryError::ValidationError { message, .. } => {
            (StatusCode::BAD_REQUEST, ApiError::new("invalid", message))
        }
        RepositoryError::ConnectionError { .. } => {
            tracing::error!("repository unavailable: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("unavailable", "Storage is temporarily unavailable."),
            )
        }
        _ => {
            tracing::error!("repository error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("internal_error", "A server error occurred."),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Service(ServiceError::Repository(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_carry_fields() {
        let err = AppError::from(ServiceError::field("topic", "This field is required."));
        let (status, body) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "invalid");
        assert_eq!(
            body.errors.unwrap()["topic"],
            vec!["This field is required.".to_string()]
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::not_authenticated(), StatusCode::UNAUTHORIZED),
            (
                ServiceError::unauthorized("You can view only your own grades."),
                StatusCode::UNAUTHORIZED,
            ),
            (ServiceError::forbidden("nope"), StatusCode::FORBIDDEN),
            (ServiceError::not_found(), StatusCode::NOT_FOUND),
            (
                ServiceError::Repository(RepositoryError::not_found_entity("talk", 1)),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Repository(RepositoryError::connection("pool exhausted")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ServiceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).parts().0, expected);
        }
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let (_, body) = AppError::from(RepositoryError::internal("secret dsn")).parts();
        assert!(!body.detail.contains("secret"));
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("errors").is_none());
    }
}
