use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "emmanuel")]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "emmanuel123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "5c1f...a9")]
    pub token: String,
    pub congregation_id: Uuid,
    #[schema(example = "Emmanuel Congregation Ahinsan")]
    pub congregation_name: String,
    #[schema(example = true)]
    pub is_district: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    pub congregation_id: Uuid,
    #[schema(example = "Emmanuel Congregation Ahinsan")]
    pub congregation_name: String,
    #[schema(example = "emmanuel")]
    pub username: String,
    pub is_district: bool,
    pub security_access_granted: bool,
    pub expires_at: DateTime<Utc>,
}
