//! Security preference reads and writes. Writing requires the
//! session-scoped elevation granted by a `security_access` challenge.

use axum::{extract::State, Json};

use crate::dtos::security::UpdatePreferencesRequest;
use crate::dtos::ErrorResponse;
use crate::middleware::AuthSession;
use crate::models::SecurityPreferences;
use crate::services::ServiceError;
use crate::utils::ValidatedJson;
use crate::AppState;
use gate_core::error::AppError;

/// Read the congregation's security preferences.
#[utoipa::path(
    get,
    path = "/security/preferences",
    responses(
        (status = 200, description = "Current preferences", body = SecurityPreferences),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Security",
    security(("bearer_token" = []))
)]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
) -> Json<SecurityPreferences> {
    Json(
        state
            .preferences
            .security(&ctx.session.principal.congregation_name),
    )
}

/// Update the congregation's security preferences.
#[utoipa::path(
    put,
    path = "/security/preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Updated preferences", body = SecurityPreferences),
        (status = 403, description = "Security access not granted", body = ErrorResponse)
    ),
    tag = "Security",
    security(("bearer_token" = []))
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
    ValidatedJson(req): ValidatedJson<UpdatePreferencesRequest>,
) -> Result<Json<SecurityPreferences>, AppError> {
    if !ctx.session.security_access_granted {
        return Err(ServiceError::PermissionDenied(
            "change security settings without security access".to_string(),
        )
        .into());
    }

    let name = &ctx.session.principal.congregation_name;
    let mut prefs = state.preferences.security(name);
    if let Some(two_factor) = req.two_factor_auth {
        prefs.two_factor_auth = two_factor;
    }
    if let Some(require_pin) = req.require_pin_for_actions {
        prefs.require_pin_for_actions = require_pin;
    }
    state.preferences.set_security(name, &prefs)?;

    Ok(Json(prefs))
}
