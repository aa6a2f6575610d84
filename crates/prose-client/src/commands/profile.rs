use serde::Serialize;
use tracing::debug;

use prose_shared::Identity;
use prose_store::Post;

use crate::error::{ClientError, Result};
use crate::state::AppState;

/// A user's page: who they are and what they wrote.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub identity: Identity,
    /// Shown in place of an avatar image.
    pub avatar_initial: String,
    /// Newest first.
    pub posts: Vec<Post>,
    /// Whether this is the signed-in identity's own profile.
    pub is_own_profile: bool,
}

pub fn profile(state: &AppState, username: &str) -> Result<Profile> {
    let session = state.session.current_session();
    let viewer = session.user_id();
    let username = username.trim();

    let store = state.content();
    let identity = store
        .user_by_username(username)
        .ok_or_else(|| ClientError::NotFound(format!("User {username}")))?;
    let posts = store.posts_by_author(identity.id, viewer)?;

    debug!(username, posts = posts.len(), "Profile loaded");
    Ok(Profile {
        is_own_profile: viewer == Some(identity.id),
        avatar_initial: identity.initial(),
        identity,
        posts,
    })
}
