use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BIO;
use crate::types::UserId;

/// A user's public profile. The id is the stable key; the username is
/// used for profile lookup but its uniqueness is not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub posts_count: u64,
    /// Likes received across this user's posts.
    pub likes_count: u64,
    pub comments_count: u64,
}

impl Identity {
    /// Create a brand new identity with zeroed counters, joined now.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            bio: DEFAULT_BIO.to_string(),
            avatar: None,
            joined_at: Utc::now(),
            posts_count: 0,
            likes_count: 0,
            comments_count: 0,
        }
    }

    /// Build an identity for an email that has no known account, using
    /// the part before `@` as the username.
    pub fn from_email(email: &str) -> Self {
        let username = email.split('@').next().unwrap_or(email).trim();
        let username = if username.is_empty() { email } else { username };
        Self::new(username, email)
    }

    /// Uppercased first character of the username, shown when there is
    /// no avatar image.
    pub fn initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_identity_has_zero_counters() {
        let id = Identity::new("ada", "ada@example.com");
        assert_eq!(id.username, "ada");
        assert_eq!(id.posts_count, 0);
        assert_eq!(id.likes_count, 0);
        assert_eq!(id.comments_count, 0);
        assert!(id.avatar.is_none());
        assert!(id.joined_at <= Utc::now());
    }

    #[test]
    fn test_from_email_uses_local_part() {
        let id = Identity::from_email("grace@navy.mil");
        assert_eq!(id.username, "grace");
        assert_eq!(id.email, "grace@navy.mil");

        let odd = Identity::from_email("@nowhere");
        assert_eq!(odd.username, "@nowhere");
    }

    #[test]
    fn test_initial() {
        assert_eq!(Identity::new("ada", "a@b.c").initial(), "A");
        assert_eq!(Identity::new("", "a@b.c").initial(), "?");
    }

    #[test]
    fn test_serializes_camel_case() {
        let id = Identity::new("ada", "ada@example.com");
        let json = serde_json::to_value(&id).unwrap();
        assert!(json.get("joinedAt").is_some());
        assert!(json.get("postsCount").is_some());
    }
}
