//! Deferred privileged actions awaiting PIN authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::member::MemberUpdate;

/// A privileged operation deferred behind the PIN challenge. The payload
/// is a tagged union keyed by kind so each executor receives a statically
/// known shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    Edit {
        member_id: Uuid,
        fields: MemberUpdate,
    },
    Delete {
        member_id: Uuid,
    },
    BulkEdit {
        member_ids: Vec<Uuid>,
        fields: MemberUpdate,
    },
    BulkDelete {
        member_ids: Vec<Uuid>,
    },
    SecurityAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Edit,
    Delete,
    BulkEdit,
    BulkDelete,
    SecurityAccess,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
            ActionKind::BulkEdit => "bulk_edit",
            ActionKind::BulkDelete => "bulk_delete",
            ActionKind::SecurityAccess => "security_access",
        }
    }
}

impl PendingAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PendingAction::Edit { .. } => ActionKind::Edit,
            PendingAction::Delete { .. } => ActionKind::Delete,
            PendingAction::BulkEdit { .. } => ActionKind::BulkEdit,
            PendingAction::BulkDelete { .. } => ActionKind::BulkDelete,
            PendingAction::SecurityAccess => ActionKind::SecurityAccess,
        }
    }

    /// Bulk kinds require a second plain confirm step after the PIN grant:
    /// prove identity first, then confirm the scope of the change.
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            PendingAction::BulkEdit { .. } | PendingAction::BulkDelete { .. }
        )
    }

    /// Build the kind-specific challenge prompt. `subject` is the display
    /// name of the targeted member when the caller has one.
    pub fn challenge(&self, subject: Option<&str>) -> ChallengePrompt {
        let subject = subject.unwrap_or("this member");
        match self {
            PendingAction::Edit { .. } => ChallengePrompt {
                kind: ActionKind::Edit,
                title: "Edit Member".to_string(),
                message: format!("Please enter your PIN to edit {}", subject),
            },
            PendingAction::Delete { .. } => ChallengePrompt {
                kind: ActionKind::Delete,
                title: "Delete Member".to_string(),
                message: format!("Please enter your PIN to delete {}", subject),
            },
            PendingAction::BulkEdit { member_ids, .. } => ChallengePrompt {
                kind: ActionKind::BulkEdit,
                title: "Bulk Edit Members".to_string(),
                message: format!(
                    "Please enter your PIN to edit {} member(s)",
                    member_ids.len()
                ),
            },
            PendingAction::BulkDelete { member_ids } => ChallengePrompt {
                kind: ActionKind::BulkDelete,
                title: "Bulk Delete Members".to_string(),
                message: format!(
                    "Please enter your PIN to delete {} member(s)",
                    member_ids.len()
                ),
            },
            PendingAction::SecurityAccess => ChallengePrompt {
                kind: ActionKind::SecurityAccess,
                title: "Security Access".to_string(),
                message: "Please enter your PIN to access security settings".to_string(),
            },
        }
    }
}

/// What the challenge UI shows for the pending action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChallengePrompt {
    pub kind: ActionKind,
    pub title: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_challenge_names_the_member() {
        let action = PendingAction::Delete {
            member_id: Uuid::new_v4(),
        };
        let prompt = action.challenge(Some("Ama Owusu"));
        assert_eq!(prompt.kind, ActionKind::Delete);
        assert_eq!(prompt.message, "Please enter your PIN to delete Ama Owusu");
    }

    #[test]
    fn only_bulk_kinds_need_second_confirmation() {
        assert!(PendingAction::BulkDelete {
            member_ids: vec![Uuid::new_v4()]
        }
        .requires_confirmation());
        assert!(PendingAction::BulkEdit {
            member_ids: vec![],
            fields: MemberUpdate::default()
        }
        .requires_confirmation());
        assert!(!PendingAction::SecurityAccess.requires_confirmation());
        assert!(!PendingAction::Delete {
            member_id: Uuid::new_v4()
        }
        .requires_confirmation());
    }

    #[test]
    fn kind_tags_serialize_snake_case() {
        let json = serde_json::to_value(PendingAction::SecurityAccess).unwrap();
        assert_eq!(json["kind"], "security_access");
    }
}
