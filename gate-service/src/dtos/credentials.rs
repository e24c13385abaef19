use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePinRequest {
    #[validate(length(min = 1, message = "Current PIN is required"))]
    #[schema(example = "1234")]
    pub current_pin: String,

    #[validate(length(min = 1, message = "New PIN is required"))]
    #[schema(example = "5678")]
    pub new_pin: String,

    #[validate(length(min = 1, message = "Confirmation PIN is required"))]
    #[schema(example = "5678")]
    pub confirm_pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub new_password: String,

    #[validate(length(min = 1, message = "Confirmation password is required"))]
    pub confirm_password: String,
}
