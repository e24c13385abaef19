//! PIN and password rotation for the calling congregation.

use axum::{extract::State, Json};

use crate::dtos::credentials::{UpdatePasswordRequest, UpdatePinRequest};
use crate::dtos::{ErrorResponse, MessageResponse};
use crate::middleware::AuthSession;
use crate::utils::ValidatedJson;
use crate::AppState;
use gate_core::error::AppError;

/// Rotate the congregation's PIN.
#[utoipa::path(
    post,
    path = "/credentials/pin",
    request_body = UpdatePinRequest,
    responses(
        (status = 200, description = "PIN changed", body = MessageResponse),
        (status = 400, description = "Current PIN incorrect or new PIN rejected", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Credentials",
    security(("bearer_token" = []))
)]
pub async fn update_pin(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
    ValidatedJson(req): ValidatedJson<UpdatePinRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.credentials.update_pin(
        ctx.session.principal.congregation_id,
        &req.current_pin,
        &req.new_pin,
        &req.confirm_pin,
    )?;

    Ok(Json(MessageResponse::new("PIN changed successfully!")))
}

/// Rotate the congregation's password.
#[utoipa::path(
    post,
    path = "/credentials/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password incorrect or new password rejected", body = ErrorResponse)
    ),
    tag = "Credentials",
    security(("bearer_token" = []))
)]
pub async fn update_password(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.credentials.update_password(
        ctx.session.principal.congregation_id,
        &req.current_password,
        &req.new_password,
        &req.confirm_password,
    )?;

    Ok(Json(MessageResponse::new("Password changed successfully!")))
}
