//! Member directory reads. Reads are session-scoped but not PIN-gated;
//! every mutation goes through the gate instead.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::dtos::members::MemberListResponse;
use crate::dtos::ErrorResponse;
use crate::middleware::AuthSession;
use crate::models::Member;
use crate::services::ServiceError;
use crate::AppState;
use gate_core::error::AppError;

/// List members visible to the calling principal.
#[utoipa::path(
    get,
    path = "/members",
    responses(
        (status = 200, description = "Member list", body = MemberListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Members",
    security(("bearer_token" = []))
)]
pub async fn list_members(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
) -> Json<MemberListResponse> {
    let members = state.members.list_for(&ctx.session.principal);
    let total = members.len();
    Json(MemberListResponse { members, total })
}

/// Fetch one member by id.
#[utoipa::path(
    get,
    path = "/members/{member_id}",
    params(
        ("member_id" = Uuid, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Member", body = Member),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    tag = "Members",
    security(("bearer_token" = []))
)]
pub async fn get_member(
    State(state): State<AppState>,
    AuthSession(ctx): AuthSession,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, AppError> {
    let member = state
        .members
        .get(member_id)
        .filter(|m| ctx.session.principal.may_act_on(m.congregation_id))
        .ok_or(ServiceError::MemberNotFound)?;

    Ok(Json(member))
}
