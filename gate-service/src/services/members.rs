//! Member directory and the action executors the gate dispatches to.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Member, MemberUpdate, Principal};

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Member not found")]
    NotFound,
}

/// Executors invoked only after the authorization gate grants access.
/// Each call is awaited by the gate; the gate does not clear its in-flight
/// marker until the call settles.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn edit_member(&self, id: Uuid, fields: &MemberUpdate) -> Result<Member, ExecutorError>;
    async fn delete_member(&self, id: Uuid) -> Result<Member, ExecutorError>;
    async fn bulk_edit(&self, ids: &[Uuid], fields: &MemberUpdate) -> Result<usize, ExecutorError>;
    async fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, ExecutorError>;
}

/// In-memory member collection. Congregation name is denormalized onto
/// each member so notifications can name the congregation without a
/// second lookup.
#[derive(Default)]
pub struct MemberDirectory {
    members: DashMap<Uuid, Member>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(members: Vec<Member>) -> Self {
        let directory = Self::new();
        for member in members {
            directory.members.insert(member.id, member);
        }
        directory
    }

    pub fn insert(&self, member: Member) {
        self.members.insert(member.id, member);
    }

    pub fn get(&self, id: Uuid) -> Option<Member> {
        self.members.get(&id).map(|m| m.clone())
    }

    /// Members visible to the principal: district admins see everyone,
    /// a congregation sees only its own members.
    pub fn list_for(&self, principal: &Principal) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .filter(|m| principal.may_act_on(m.congregation_id))
            .map(|m| m.clone())
            .collect();
        members.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[async_trait]
impl ActionExecutor for MemberDirectory {
    async fn edit_member(&self, id: Uuid, fields: &MemberUpdate) -> Result<Member, ExecutorError> {
        let mut entry = self.members.get_mut(&id).ok_or(ExecutorError::NotFound)?;
        fields.apply_to(&mut entry);
        Ok(entry.clone())
    }

    async fn delete_member(&self, id: Uuid) -> Result<Member, ExecutorError> {
        self.members
            .remove(&id)
            .map(|(_, member)| member)
            .ok_or(ExecutorError::NotFound)
    }

    /// Applies the delta to every id it can find; ids that no longer
    /// exist are skipped and the returned count reflects actual edits.
    async fn bulk_edit(&self, ids: &[Uuid], fields: &MemberUpdate) -> Result<usize, ExecutorError> {
        let mut edited = 0;
        for id in ids {
            if let Some(mut entry) = self.members.get_mut(id) {
                fields.apply_to(&mut entry);
                edited += 1;
            }
        }
        Ok(edited)
    }

    async fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, ExecutorError> {
        let mut deleted = 0;
        for id in ids {
            if self.members.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn member(congregation_id: Uuid, first: &str, last: &str) -> Member {
        Member {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            gender: Gender::Female,
            phone_number: format!("024{}", rand::random::<u32>() % 10_000_000),
            congregation_id,
            congregation_name: "Emmanuel Congregation Ahinsan".to_string(),
        }
    }

    #[tokio::test]
    async fn delete_returns_the_removed_member_once() {
        let congregation = Uuid::new_v4();
        let m = member(congregation, "Ama", "Owusu");
        let id = m.id;
        let directory = MemberDirectory::seed(vec![m]);

        let removed = directory.delete_member(id).await.unwrap();
        assert_eq!(removed.full_name(), "Ama Owusu");
        assert!(matches!(
            directory.delete_member(id).await,
            Err(ExecutorError::NotFound)
        ));
    }

    #[tokio::test]
    async fn bulk_delete_skips_missing_ids() {
        let congregation = Uuid::new_v4();
        let a = member(congregation, "Kofi", "Asante");
        let b = member(congregation, "Esi", "Boateng");
        let ids = vec![a.id, Uuid::new_v4(), b.id];
        let directory = MemberDirectory::seed(vec![a, b]);

        let deleted = directory.bulk_delete(&ids).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_principal() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let directory = MemberDirectory::seed(vec![
            member(own, "Yaa", "Mensah"),
            member(other, "Kwesi", "Appiah"),
        ]);

        let local = Principal {
            congregation_id: own,
            congregation_name: "Emmanuel Congregation Ahinsan".to_string(),
            username: "emmanuel".to_string(),
            is_district: false,
        };
        assert_eq!(directory.list_for(&local).len(), 1);

        let district = Principal {
            is_district: true,
            ..local
        };
        assert_eq!(directory.list_for(&district).len(), 2);
    }
}
