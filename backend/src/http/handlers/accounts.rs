//! Registration, activation, login/logout, password change and reset.

use axum::extract::State;
use axum::Json;

use super::{created, Created, HandlerResult};
use crate::api::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    PasswordResetConfirmRequest, PasswordResetRequest, RegisterRequest, UserInfo,
};
use crate::http::extract::{CurrentUser, Path, Payload};
use crate::http::state::AppState;
use crate::services::accounts;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Payload(request): Payload<RegisterRequest>,
) -> Created<UserInfo> {
    let user = accounts::register(
        state.repository.as_ref(),
        &state.settings.activation_url,
        request,
    )
    .await?;
    created(user)
}

/// GET /api/activate/{activation_key}
pub async fn activate(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> HandlerResult<MessageResponse> {
    Ok(Json(accounts::activate(state.repository.as_ref(), &key).await?))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Payload(request): Payload<LoginRequest>,
) -> HandlerResult<LoginResponse> {
    Ok(Json(accounts::login(state.repository.as_ref(), request).await?))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> HandlerResult<MessageResponse> {
    Ok(Json(accounts::logout(state.repository.as_ref(), &principal).await?))
}

/// PUT /api/password/change
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Payload(request): Payload<ChangePasswordRequest>,
) -> HandlerResult<MessageResponse> {
    Ok(Json(
        accounts::change_password(state.repository.as_ref(), &principal, request).await?,
    ))
}

/// POST /api/password/reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    Payload(request): Payload<PasswordResetRequest>,
) -> HandlerResult<MessageResponse> {
    Ok(Json(
        accounts::request_password_reset(
            state.repository.as_ref(),
            &state.settings.password_reset_url,
            request,
        )
        .await?,
    ))
}

/// POST /api/password/reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Payload(request): Payload<PasswordResetConfirmRequest>,
) -> HandlerResult<MessageResponse> {
    Ok(Json(
        accounts::confirm_password_reset(state.repository.as_ref(), request).await?,
    ))
}
