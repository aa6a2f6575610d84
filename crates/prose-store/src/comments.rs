use prose_shared::{CommentId, PostId};

use crate::error::{Result, StoreError};
use crate::models::Comment;
use crate::store::ContentStore;

impl ContentStore {
    /// Attach a comment to its post and bump the post's comment counter.
    pub fn insert_comment(&mut self, comment: Comment) -> Result<Comment> {
        if self.comments.iter().any(|c| c.id == comment.id) {
            return Err(StoreError::Duplicate(format!("Comment {}", comment.id)));
        }
        let record = self.record_mut(comment.post_id)?;
        record.comments_count += 1;

        tracing::debug!(comment = %comment.id, post = %comment.post_id, "comment stored");
        self.comments.push(comment.clone());
        Ok(comment)
    }

    /// Remove a comment and decrement its post's counter.
    /// Returns `false` when no such comment existed.
    pub fn remove_comment(&mut self, id: CommentId) -> Result<bool> {
        let Some(pos) = self.comments.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        let comment = self.comments.remove(pos);
        if let Ok(record) = self.record_mut(comment.post_id) {
            record.comments_count = record.comments_count.saturating_sub(1);
        }
        Ok(true)
    }

    /// Comments on `post`, oldest first.
    pub fn comments_for_post(&self, post: PostId) -> Result<Vec<Comment>> {
        self.record(post)?;
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}
