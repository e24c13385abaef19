use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Member;

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
    #[schema(example = 5)]
    pub total: usize,
}
