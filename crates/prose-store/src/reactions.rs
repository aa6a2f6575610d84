use prose_shared::{PostId, UserId};

use crate::error::Result;
use crate::models::LikeState;
use crate::store::ContentStore;

impl ContentStore {
    /// Current like state of `post` from `viewer`'s point of view.
    pub fn like_state(&self, post: PostId, viewer: UserId) -> Result<LikeState> {
        let record = self.record(post)?;
        Ok(LikeState {
            is_liked: record.liked_by.contains(&viewer),
            likes_count: record.likes_count,
        })
    }

    /// Overwrite the like state for `viewer`. Flag and counter are written
    /// in the same call so no reader ever sees one without the other.
    /// The author's received-likes total is left untouched.
    pub fn set_like_state(&mut self, post: PostId, viewer: UserId, state: LikeState) -> Result<()> {
        let record = self.record_mut(post)?;
        if state.is_liked {
            record.liked_by.insert(viewer);
        } else {
            record.liked_by.remove(&viewer);
        }
        record.likes_count = state.likes_count;
        Ok(())
    }

    /// Toggle `viewer`'s like on `post`, returning the state before and
    /// after the change. The post author's `likes_count` moves with it.
    pub fn toggle_like(&mut self, post: PostId, viewer: UserId) -> Result<(LikeState, LikeState)> {
        let before = self.like_state(post, viewer)?;
        let after = before.toggled();
        self.set_like_state(post, viewer, after)?;

        let author_id = self.record(post)?.author_id;
        if let Some(author) = self.users.get_mut(&author_id) {
            author.likes_count = if after.is_liked {
                author.likes_count + 1
            } else {
                author.likes_count.saturating_sub(1)
            };
        }
        tracing::debug!(
            post = %post,
            user = %viewer,
            liked = after.is_liked,
            likes = after.likes_count,
            "like toggled"
        );
        Ok((before, after))
    }
}
