use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePreferencesRequest {
    pub two_factor_auth: Option<bool>,
    pub require_pin_for_actions: Option<bool>,
}
