//! Member (guilder) model - the entity mutated behind the gate.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub phone_number: String,
    pub congregation_id: Uuid,
    /// Denormalized so notifications can name the congregation without a
    /// second lookup.
    pub congregation_name: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Partial update applied by the edit and bulk-edit executors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.phone_number.is_none()
    }

    /// Apply the delta, returning true if any field actually changed.
    pub fn apply_to(&self, member: &mut Member) -> bool {
        let before = member.clone();
        if let Some(v) = &self.first_name {
            member.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            member.last_name = v.clone();
        }
        if let Some(v) = self.gender {
            member.gender = v;
        }
        if let Some(v) = &self.phone_number {
            member.phone_number = v.clone();
        }
        *member != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        Member {
            id: Uuid::new_v4(),
            first_name: "Kwame".to_string(),
            last_name: "Mensah".to_string(),
            gender: Gender::Male,
            phone_number: "0244000001".to_string(),
            congregation_id: Uuid::new_v4(),
            congregation_name: "Emmanuel Congregation Ahinsan".to_string(),
        }
    }

    #[test]
    fn apply_reports_whether_anything_changed() {
        let mut m = member();
        let noop = MemberUpdate {
            first_name: Some("Kwame".to_string()),
            ..Default::default()
        };
        assert!(!noop.apply_to(&mut m));

        let update = MemberUpdate {
            phone_number: Some("0244999999".to_string()),
            ..Default::default()
        };
        assert!(update.apply_to(&mut m));
        assert_eq!(m.phone_number, "0244999999");
    }
}
