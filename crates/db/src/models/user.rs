use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{Store, types::Role};

/// Identity record owned by the external auth system. This core reads users
/// and references them from boards and tasks; it never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn create(store: &Store, user: User) -> User {
        store.users().insert(user.id, user.clone());
        user
    }

    pub fn find_by_id(store: &Store, id: Uuid) -> Option<User> {
        store.users().get(&id).map(|user| user.value().clone())
    }

    /// Resolves an identity string to a user. Matches email or display name,
    /// case-sensitive exact comparison.
    pub fn find_by_identity(store: &Store, identity: &str) -> Option<User> {
        store
            .users()
            .iter()
            .find(|user| user.email == identity || user.name == identity)
            .map(|user| user.value().clone())
    }
}
