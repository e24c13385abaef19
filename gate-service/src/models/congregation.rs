//! Congregation and principal identity models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A congregation account. The district admin is itself a congregation
/// record with `is_district` set, mirroring how logins are scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Congregation {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub is_district: bool,
}

/// The identity attempting privileged actions in the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub congregation_id: Uuid,
    pub congregation_name: String,
    pub username: String,
    pub is_district: bool,
}

impl Principal {
    pub fn from_congregation(c: &Congregation) -> Self {
        Self {
            congregation_id: c.id,
            congregation_name: c.name.clone(),
            username: c.username.clone(),
            is_district: c.is_district,
        }
    }

    /// District admins may act on any congregation's members; everyone
    /// else is confined to their own congregation.
    pub fn may_act_on(&self, congregation_id: Uuid) -> bool {
        self.is_district || self.congregation_id == congregation_id
    }
}
