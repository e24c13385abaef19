use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{ActionKind, ChallengePrompt, PendingAction};
use crate::services::SubmitOutcome;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GateRequestBody {
    pub action: PendingAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeResponse {
    pub challenge: ChallengePrompt,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitPinRequest {
    #[validate(length(min = 1, message = "PIN is required"))]
    #[schema(example = "1234")]
    pub pin: String,
}

/// How a settled submit or confirm is reported over the wire. `granted`
/// distinguishes a denial (challenge still open) from a completed grant.
#[derive(Debug, Serialize, ToSchema)]
pub struct GateOutcomeResponse {
    pub granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ActionKind>,
    /// Set when a bulk action is granted and now awaits its confirm call.
    pub awaiting_confirmation: bool,
    #[schema(example = "Member deleted successfully!")]
    pub message: String,
}

impl From<SubmitOutcome> for GateOutcomeResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Executed { kind, message } => Self {
                granted: true,
                kind: Some(kind),
                awaiting_confirmation: false,
                message,
            },
            SubmitOutcome::SecurityAccessGranted => Self {
                granted: true,
                kind: Some(ActionKind::SecurityAccess),
                awaiting_confirmation: false,
                message: "Security access granted!".to_string(),
            },
            SubmitOutcome::AwaitingConfirmation { kind, message } => Self {
                granted: true,
                kind: Some(kind),
                awaiting_confirmation: true,
                message,
            },
            SubmitOutcome::Denied { message } => Self {
                granted: false,
                kind: None,
                awaiting_confirmation: false,
                message,
            },
            SubmitOutcome::NothingPending => Self {
                granted: true,
                kind: None,
                awaiting_confirmation: false,
                message: "No action was pending.".to_string(),
            },
        }
    }
}
