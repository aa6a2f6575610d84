use tracing::{debug, warn};

use prose_remote::ContentMutation;
use prose_shared::PostId;
use prose_store::Comment;

use crate::commands::auth::register_identity;
use crate::error::{ClientError, Result};
use crate::events::ClientEvent;
use crate::optimistic::ReconcilePolicy;
use crate::state::AppState;

/// Comment on `post_id` as the signed-in identity.
///
/// The comment is stored and broadcast at once, then confirmed. Under
/// [`ReconcilePolicy::Rollback`] a failed confirmation withdraws it again.
pub async fn submit_comment(state: &AppState, post_id: PostId, content: &str) -> Result<Comment> {
    let identity = state.session.require_identity()?;
    if content.trim().is_empty() {
        return Err(ClientError::Validation("comment is empty".into()));
    }

    let comment = {
        let mut store = state.content();
        let comment = store.insert_comment(Comment::new(post_id, identity.clone(), content))?;
        register_identity(&mut store, &identity);
        store.update_user(identity.id, |u| u.comments_count += 1)?;
        comment
    };
    state
        .session
        .update_identity(identity.id, |i| i.comments_count += 1);
    state.events.emit(ClientEvent::CommentAdded {
        comment: comment.clone(),
    });

    let mutation = ContentMutation::Comment {
        post_id,
        comment_id: comment.id,
        user_id: identity.id,
        content: comment.content.clone(),
    };
    let err = match state.content_service.confirm(mutation).await {
        Ok(()) => {
            debug!(post = %post_id, comment = %comment.id, "Comment confirmed");
            return Ok(comment);
        }
        Err(e) => e,
    };

    if state.reconcile == ReconcilePolicy::FireAndForget {
        warn!(post = %post_id, comment = %comment.id, error = %err, "Comment not confirmed, keeping it");
        return Ok(comment);
    }

    let removed = {
        let mut store = state.content();
        let removed = store.remove_comment(comment.id)?;
        if removed {
            store.update_user(identity.id, |u| {
                u.comments_count = u.comments_count.saturating_sub(1)
            })?;
        }
        removed
    };
    if removed {
        state.session.update_identity(identity.id, |i| {
            i.comments_count = i.comments_count.saturating_sub(1)
        });
        state.events.emit(ClientEvent::CommentRemoved {
            post_id,
            comment_id: comment.id,
        });
    }

    warn!(post = %post_id, comment = %comment.id, error = %err, "Comment not confirmed, withdrawn");
    state.events.emit(ClientEvent::MutationFailed {
        kind: "comment",
        post_id,
        message: err.to_string(),
    });
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prose_remote::fakes::FakeBackend;

    use super::*;
    use crate::commands::auth;
    use crate::commands::test_support::state_with_post;

    async fn signed_in(fake: &FakeBackend, reconcile: ReconcilePolicy) -> (Arc<AppState>, PostId) {
        let (state, post_id) = state_with_post(fake, reconcile, 0);
        auth::sign_up(&state, "ada", "ada@example.com", "pw")
            .await
            .unwrap();
        (Arc::new(state), post_id)
    }

    fn comment_count(state: &AppState, post_id: PostId) -> u64 {
        state.content().get_post(post_id, None).unwrap().comments_count
    }

    #[tokio::test]
    async fn test_comment_is_stored_and_confirmed() {
        let fake = FakeBackend::new();
        let (state, post_id) = signed_in(&fake, ReconcilePolicy::Rollback).await;

        let comment = submit_comment(&state, post_id, "nice one").await.unwrap();
        assert_eq!(comment.author.username, "ada");
        assert_eq!(comment_count(&state, post_id), 1);
        assert_eq!(
            state.session.current_session().identity().unwrap().comments_count,
            1
        );
        assert!(matches!(
            fake.mutations()[0],
            ContentMutation::Comment { .. }
        ));
    }

    #[tokio::test]
    async fn test_comment_requires_session_and_content() {
        let fake = FakeBackend::new();
        let (state, post_id) = state_with_post(&fake, ReconcilePolicy::Rollback, 0);
        assert_eq!(
            submit_comment(&state, post_id, "hi").await.unwrap_err(),
            ClientError::Unauthorized
        );

        auth::sign_up(&state, "ada", "ada@example.com", "pw")
            .await
            .unwrap();
        assert!(matches!(
            submit_comment(&state, post_id, "  ").await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(comment_count(&state, post_id), 0);
        assert_eq!(fake.confirm_calls(), 0);
    }

    #[tokio::test]
    async fn test_comment_visible_before_confirmation() {
        let fake = FakeBackend::gated();
        let (state, post_id) = signed_in(&fake, ReconcilePolicy::Rollback).await;

        let task = {
            let state = state.clone();
            tokio::spawn(async move { submit_comment(&state, post_id, "early").await })
        };
        fake.wait_for_confirms(1).await;
        assert_eq!(comment_count(&state, post_id), 1);

        fake.release(1);
        task.await.unwrap().unwrap();
        assert_eq!(comment_count(&state, post_id), 1);
    }

    #[tokio::test]
    async fn test_failed_comment_is_withdrawn() {
        let fake = FakeBackend::new();
        let (state, post_id) = signed_in(&fake, ReconcilePolicy::Rollback).await;
        let mut events = state.events.subscribe();
        fake.fail_next_confirms(1);

        let err = submit_comment(&state, post_id, "lost").await.unwrap_err();
        assert!(matches!(err, ClientError::RemoteFailure(_)));
        assert_eq!(comment_count(&state, post_id), 0);
        assert!(state.content().comments_for_post(post_id).unwrap().is_empty());
        assert_eq!(
            state.session.current_session().identity().unwrap().comments_count,
            0
        );

        let names: Vec<_> = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ]
        .iter()
        .map(|e| e.name())
        .collect();
        assert_eq!(
            names,
            vec!["comment-added", "comment-removed", "mutation-failed"]
        );
    }

    #[tokio::test]
    async fn test_fire_and_forget_keeps_comment() {
        let fake = FakeBackend::new();
        let (state, post_id) = signed_in(&fake, ReconcilePolicy::FireAndForget).await;
        fake.fail_next_confirms(1);

        submit_comment(&state, post_id, "stays").await.unwrap();
        assert_eq!(comment_count(&state, post_id), 1);
    }

    #[tokio::test]
    async fn test_comment_on_unknown_post() {
        let fake = FakeBackend::new();
        let (state, _) = signed_in(&fake, ReconcilePolicy::Rollback).await;
        let err = submit_comment(&state, PostId::new(), "where").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}
