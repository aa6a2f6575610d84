//! Content model structs handed out by the store.
//!
//! Every public struct derives `Serialize` so it can be handed directly to
//! a presentation layer. Records returned from the store are snapshots:
//! mutating them has no effect on the store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use prose_shared::{CommentId, Identity, PostId, UserId};

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A published post as seen by one viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    /// Text body, at most 500 characters.
    pub content: String,
    /// Snapshot of the author's profile at read time.
    pub author: Identity,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub likes_count: u64,
    pub comments_count: u64,
    /// Whether the viewing identity likes this post. Always `false` for
    /// anonymous viewers.
    pub is_liked: bool,
}

impl Post {
    pub fn like_state(&self) -> LikeState {
        LikeState {
            is_liked: self.is_liked,
            likes_count: self.likes_count,
        }
    }
}

/// Stored form of a post. Likes are kept per liker so that `is_liked` can
/// be answered for any viewer.
#[derive(Debug, Clone)]
pub(crate) struct PostRecord {
    pub id: PostId,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Total likes, including ones from identities outside this client's
    /// directory (fixture counts).
    pub likes_count: u64,
    pub comments_count: u64,
    pub liked_by: HashSet<UserId>,
}

/// Data needed to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: PostId,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Likes already attributed to the post (used by fixtures).
    pub likes_count: u64,
}

impl NewPost {
    pub fn new(author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: PostId::new(),
            content: content.into(),
            author_id,
            created_at: Utc::now(),
            likes_count: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Like state
// ---------------------------------------------------------------------------

/// The `(is_liked, likes_count)` pair for one viewer and one post.
///
/// The two fields only ever change together through [`LikeState::toggled`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub is_liked: bool,
    pub likes_count: u64,
}

impl LikeState {
    pub fn new(is_liked: bool, likes_count: u64) -> Self {
        Self {
            is_liked,
            likes_count,
        }
    }

    /// Flip the flag and move the counter by one in the same direction.
    pub fn toggled(self) -> Self {
        if self.is_liked {
            Self {
                is_liked: false,
                likes_count: self.likes_count.saturating_sub(1),
            }
        } else {
            Self {
                is_liked: true,
                likes_count: self.likes_count + 1,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author: Identity,
    /// The post this comment refers to.
    pub post_id: PostId,
    pub created_at: DateTime<Utc>,
    /// Reserved for threaded replies; nothing builds threads yet.
    pub parent_id: Option<CommentId>,
}

impl Comment {
    pub fn new(post_id: PostId, author: Identity, content: impl Into<String>) -> Self {
        Self {
            id: CommentId::new(),
            content: content.into(),
            author,
            post_id,
            created_at: Utc::now(),
            parent_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_moves_flag_and_count_together() {
        let start = LikeState::new(false, 3);
        let liked = start.toggled();
        assert_eq!(liked, LikeState::new(true, 4));
        let back = liked.toggled();
        assert_eq!(back, start);
    }

    #[test]
    fn test_unlike_at_zero_does_not_underflow() {
        let odd = LikeState::new(true, 0);
        assert_eq!(odd.toggled(), LikeState::new(false, 0));
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let author = Identity::new("ada", "ada@example.com");
        let post = Post {
            id: PostId::new(),
            content: "hello".into(),
            author,
            created_at: Utc::now(),
            updated_at: None,
            likes_count: 2,
            comments_count: 1,
            is_liked: true,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["likesCount"], 2);
        assert_eq!(json["isLiked"], true);
        assert_eq!(json["author"]["username"], "ada");
        assert!(json["updatedAt"].is_null());
    }

    #[test]
    fn test_comment_defaults() {
        let author = Identity::new("ada", "ada@example.com");
        let post_id = PostId::new();
        let comment = Comment::new(post_id, author.clone(), "nice");
        assert_eq!(comment.post_id, post_id);
        assert_eq!(comment.author, author);
        assert!(comment.parent_id.is_none());
    }
}
