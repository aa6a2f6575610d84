//! Store ownership and snapshot construction.
//!
//! The [`ContentStore`] owns every post, comment, and known identity. Typed
//! helpers live in sibling modules (`posts`, `comments`, `reactions`,
//! `users`) as further `impl ContentStore` blocks.

use std::collections::HashMap;

use prose_shared::{Identity, PostId, UserId};

use crate::error::{Result, StoreError};
use crate::fixtures;
use crate::models::{Comment, Post, PostRecord};

/// In-memory content store.
#[derive(Debug, Default)]
pub struct ContentStore {
    pub(crate) posts: HashMap<PostId, PostRecord>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) users: HashMap<UserId, Identity>,
}

impl ContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the fixture users, posts, and
    /// comments.
    pub fn with_fixtures() -> Self {
        let mut store = Self::new();
        fixtures::seed(&mut store);
        tracing::info!(
            users = store.users.len(),
            posts = store.posts.len(),
            comments = store.comments.len(),
            "seeded content store"
        );
        store
    }

    pub(crate) fn record(&self, id: PostId) -> Result<&PostRecord> {
        self.posts
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("Post {id}")))
    }

    pub(crate) fn record_mut(&mut self, id: PostId) -> Result<&mut PostRecord> {
        self.posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("Post {id}")))
    }

    /// Build the viewer-relative snapshot of a stored post.
    pub(crate) fn snapshot(&self, record: &PostRecord, viewer: Option<UserId>) -> Result<Post> {
        let author = self
            .users
            .get(&record.author_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {}", record.author_id)))?;

        Ok(Post {
            id: record.id,
            content: record.content.clone(),
            author,
            created_at: record.created_at,
            updated_at: record.updated_at,
            likes_count: record.likes_count,
            comments_count: record.comments_count,
            is_liked: viewer.is_some_and(|v| record.liked_by.contains(&v)),
        })
    }

    /// Snapshot a list of records, newest first.
    pub(crate) fn snapshot_all<'a>(
        &self,
        records: impl Iterator<Item = &'a PostRecord>,
        viewer: Option<UserId>,
    ) -> Result<Vec<Post>> {
        let mut posts = records
            .map(|r| self.snapshot(r, viewer))
            .collect::<Result<Vec<_>>>()?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    /// Number of stored posts.
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}
