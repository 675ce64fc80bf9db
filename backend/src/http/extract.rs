//! Request extractors: token authentication, path and query parameters, and JSON bodies.
//!
//! Every rejection is an [`AppError`], so malformed requests get the JSON error body.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use super::error::AppError;
use super::state::AppState;
use crate::services::{accounts, Principal, ServiceError};

/// The caller resolved from `Authorization: Token <key>`, if any.
///
/// An invalid token is rejected even on endpoints that allow anonymous access.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Principal>);

impl MaybeUser {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ServiceError::Unauthenticated(
                    "Invalid token header. Token string should not contain invalid characters."
                        .to_string(),
                )
            })?),
            None => None,
        };
        let principal = accounts::authenticate(state.repository.as_ref(), header).await?;
        Ok(MaybeUser(principal))
    }
}

/// An authenticated caller; anonymous requests get 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeUser(principal) = MaybeUser::from_request_parts(parts, state).await?;
        principal
            .map(CurrentUser)
            .ok_or_else(|| ServiceError::not_authenticated().into())
    }
}

/// JSON body whose decoding failures become `AppError::BadRequest`.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Path parameters whose parsing failures become `AppError::BadRequest`.
#[derive(Debug, Clone)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Query string whose parsing failures become `AppError::BadRequest`.
#[derive(Debug, Clone)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Query(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}
