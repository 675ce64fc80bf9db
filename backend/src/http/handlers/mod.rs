//! HTTP handlers for the REST API.
//!
//! Each handler authenticates the caller through an extractor and delegates
//! to the service layer for permissions and business rules.

use axum::{extract::State, http::StatusCode, Json};

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;

pub mod accounts;
pub mod coursework;
pub mod meetups;
pub mod news;
pub mod school;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource (201).
pub type Created<T> = Result<(StatusCode, Json<T>), AppError>;

/// Result type for handlers that delete a resource (204).
pub type Deleted = Result<StatusCode, AppError>;

pub(crate) fn created<T>(value: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

pub(crate) fn deleted() -> Deleted {
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health
///
/// Reports whether the storage backend answers.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    }))
}
