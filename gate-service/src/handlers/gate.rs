//! The PIN challenge workflow over HTTP: request a challenge, submit the
//! PIN, confirm a granted bulk action, or cancel.

use axum::{extract::State, Json};

use crate::dtos::gate::{ChallengeResponse, GateOutcomeResponse, GateRequestBody, SubmitPinRequest};
use crate::dtos::{ErrorResponse, MessageResponse};
use crate::middleware::{AuthSession, SessionContext};
use crate::models::PendingAction;
use crate::services::metrics::record_pin_challenge;
use crate::services::{ServiceError, SubmitOutcome};
use crate::utils::ValidatedJson;
use crate::AppState;
use gate_core::error::AppError;

/// Scope check plus subject lookup for a requested action. Single-member
/// actions resolve the member's display name for the challenge message;
/// bulk actions verify every listed member the principal can see.
fn resolve_subject(
    state: &AppState,
    ctx: &SessionContext,
    action: &PendingAction,
) -> Result<Option<String>, ServiceError> {
    let principal = &ctx.session.principal;
    match action {
        PendingAction::Edit { member_id, .. } | PendingAction::Delete { member_id } => {
            let member = state
                .members
                .get(*member_id)
                .ok_or(ServiceError::MemberNotFound)?;
            if !principal.may_act_on(member.congregation_id) {
                return Err(ServiceError::PermissionDenied(
                    "manage members of another congregation".to_string(),
                ));
            }
            Ok(Some(member.full_name()))
        }
        PendingAction::BulkEdit { member_ids, .. } | PendingAction::BulkDelete { member_ids } => {
            for id in member_ids {
                if let Some(member) = state.members.get(*id) {
                    if !principal.may_act_on(member.congregation_id) {
                        return Err(ServiceError::PermissionDenied(
                            "manage members of another congregation".to_string(),
                        ));
                    }
                }
            }
            Ok(None)
        }
        PendingAction::SecurityAccess => Ok(None),
    }
}

/// Park a privileged action behind a PIN challenge.
#[utoipa::path(
    post,
    path = "/gate/request",
    request_body = GateRequestBody,
    responses(
        (status = 200, description = "Challenge issued", body = ChallengeResponse),
        (status = 403, description = "Not permitted for this congregation", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Verification already in progress", body = ErrorResponse)
    ),
    tag = "Gate",
    security(("bearer_token" = []))
)]
pub async fn request_challenge(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
    ValidatedJson(req): ValidatedJson<GateRequestBody>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let subject = resolve_subject(&state, &ctx, &req.action)?;
    let gate = state.gates.for_session(
        &ctx.token_hash,
        &ctx.session.principal,
        ctx.session.expires_at,
    );
    let challenge = gate.request(req.action, subject.as_deref())?;

    Ok(Json(ChallengeResponse { challenge }))
}

/// Submit the PIN for the open challenge.
#[utoipa::path(
    post,
    path = "/gate/submit",
    request_body = SubmitPinRequest,
    responses(
        (status = 200, description = "Challenge settled", body = GateOutcomeResponse),
        (status = 400, description = "Malformed PIN", body = ErrorResponse),
        (status = 409, description = "No challenge or verification in progress", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Gate",
    security(("bearer_token" = []))
)]
pub async fn submit_pin(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
    ValidatedJson(req): ValidatedJson<SubmitPinRequest>,
) -> Result<Json<GateOutcomeResponse>, AppError> {
    let gate = state.gates.for_session(
        &ctx.token_hash,
        &ctx.session.principal,
        ctx.session.expires_at,
    );
    let outcome = gate.submit(&req.pin).await?;

    match &outcome {
        SubmitOutcome::Executed { kind, .. } => {
            record_pin_challenge(kind.as_str(), "granted");
        }
        SubmitOutcome::AwaitingConfirmation { kind, .. } => {
            record_pin_challenge(kind.as_str(), "granted");
        }
        SubmitOutcome::SecurityAccessGranted => {
            record_pin_challenge("security_access", "granted");
            // session-scoped elevation, dies with the session
            if !state.sessions.grant_security_access(&ctx.token) {
                tracing::warn!("Session vanished before elevation could be recorded");
            }
        }
        SubmitOutcome::Denied { .. } => {
            let kind = gate.pending_kind().map(|k| k.as_str()).unwrap_or("none");
            record_pin_challenge(kind, "denied");
        }
        SubmitOutcome::NothingPending => {}
    }

    Ok(Json(outcome.into()))
}

/// Execute the held bulk action after its PIN grant.
#[utoipa::path(
    post,
    path = "/gate/confirm",
    responses(
        (status = 200, description = "Bulk action executed", body = GateOutcomeResponse),
        (status = 409, description = "No action awaiting confirmation", body = ErrorResponse)
    ),
    tag = "Gate",
    security(("bearer_token" = []))
)]
pub async fn confirm_action(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
) -> Result<Json<GateOutcomeResponse>, AppError> {
    let gate = state.gates.for_session(
        &ctx.token_hash,
        &ctx.session.principal,
        ctx.session.expires_at,
    );
    let outcome = gate.confirm().await?;
    Ok(Json(outcome.into()))
}

/// Abandon the open challenge or held action.
#[utoipa::path(
    post,
    path = "/gate/cancel",
    responses(
        (status = 200, description = "Cancelled", body = MessageResponse),
        (status = 409, description = "Verification in progress", body = ErrorResponse)
    ),
    tag = "Gate",
    security(("bearer_token" = []))
)]
pub async fn cancel_challenge(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
) -> Result<Json<MessageResponse>, AppError> {
    let gate = state.gates.for_session(
        &ctx.token_hash,
        &ctx.session.principal,
        ctx.session.expires_at,
    );
    gate.cancel()?;
    Ok(Json(MessageResponse::new("Action cancelled.")))
}
