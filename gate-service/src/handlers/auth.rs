//! Login, logout, and session introspection.

use axum::{extract::State, http::StatusCode, Json};

use crate::dtos::auth::{LoginRequest, LoginResponse, SessionStatusResponse};
use crate::dtos::{ErrorResponse, MessageResponse};
use crate::middleware::AuthSession;
use crate::utils::ValidatedJson;
use crate::AppState;
use gate_core::error::AppError;

/// Authenticate a congregation account and start a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let principal = state
        .credentials
        .authenticate(&req.username, &req.password)?;

    let (token, session) = state.sessions.start_session(principal.clone());
    tracing::info!(congregation = %principal.congregation_name, "Login successful");

    Ok(Json(LoginResponse {
        token,
        congregation_id: principal.congregation_id,
        congregation_name: principal.congregation_name,
        is_district: principal.is_district,
        expires_at: session.expires_at,
    }))
}

/// End the current session and drop its gate.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("bearer_token" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.gates.remove(&ctx.token_hash);
    state.sessions.end_session(&ctx.token);

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Logged out successfully.")),
    ))
}

/// Describe the calling session.
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Auth",
    security(("bearer_token" = []))
)]
pub async fn session_status(AuthSession(ctx): AuthSession) -> Json<SessionStatusResponse> {
    let session = ctx.session;
    Json(SessionStatusResponse {
        congregation_id: session.principal.congregation_id,
        congregation_name: session.principal.congregation_name,
        username: session.principal.username,
        is_district: session.principal.is_district,
        security_access_granted: session.security_access_granted,
        expires_at: session.expires_at,
    })
}
