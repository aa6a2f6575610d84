use prose_shared::{Identity, UserId};

use crate::error::{Result, StoreError};
use crate::store::ContentStore;

impl ContentStore {
    /// Insert or replace a known identity.
    pub fn upsert_user(&mut self, identity: Identity) {
        tracing::debug!(user = %identity.id, username = %identity.username, "user upserted");
        self.users.insert(identity.id, identity);
    }

    pub fn get_user(&self, id: UserId) -> Result<Identity> {
        self.users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {id}")))
    }

    /// Case-insensitive email lookup.
    pub fn user_by_email(&self, email: &str) -> Option<Identity> {
        let email = email.trim();
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn user_by_username(&self, username: &str) -> Option<Identity> {
        self.users.values().find(|u| u.username == username).cloned()
    }

    /// Every known identity, oldest member first.
    pub fn list_users(&self) -> Vec<Identity> {
        let mut users: Vec<Identity> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.joined_at);
        users
    }

    /// Apply `f` to a stored identity and return the updated copy.
    pub fn update_user(&mut self, id: UserId, f: impl FnOnce(&mut Identity)) -> Result<Identity> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("User {id}")))?;
        f(user);
        Ok(user.clone())
    }
}
