use std::collections::HashSet;

use prose_shared::{PostId, UserId};

use crate::error::{Result, StoreError};
use crate::models::{NewPost, Post, PostRecord};
use crate::store::ContentStore;

impl ContentStore {
    /// Store a new post and return it as seen by its author.
    pub fn insert_post(&mut self, new_post: NewPost) -> Result<Post> {
        if !self.users.contains_key(&new_post.author_id) {
            return Err(StoreError::NotFound(format!("User {}", new_post.author_id)));
        }
        if self.posts.contains_key(&new_post.id) {
            return Err(StoreError::Duplicate(format!("Post {}", new_post.id)));
        }

        let record = PostRecord {
            id: new_post.id,
            content: new_post.content,
            author_id: new_post.author_id,
            created_at: new_post.created_at,
            updated_at: None,
            likes_count: new_post.likes_count,
            comments_count: 0,
            liked_by: HashSet::new(),
        };
        let id = record.id;
        self.posts.insert(id, record);

        tracing::debug!(post = %id, author = %new_post.author_id, "post stored");
        self.get_post(id, Some(new_post.author_id))
    }

    pub fn get_post(&self, id: PostId, viewer: Option<UserId>) -> Result<Post> {
        let record = self.record(id)?;
        self.snapshot(record, viewer)
    }

    /// Every post, newest first.
    pub fn list_posts(&self, viewer: Option<UserId>) -> Result<Vec<Post>> {
        self.snapshot_all(self.posts.values(), viewer)
    }

    /// Posts written by `author`, newest first.
    pub fn posts_by_author(&self, author: UserId, viewer: Option<UserId>) -> Result<Vec<Post>> {
        self.snapshot_all(
            self.posts.values().filter(|r| r.author_id == author),
            viewer,
        )
    }
}
