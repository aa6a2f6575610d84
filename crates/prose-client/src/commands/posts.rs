use tracing::{debug, info, warn};

use prose_remote::ContentMutation;
use prose_shared::content::{char_count, validate_post_content};
use prose_shared::{Identity, PostId, UserId};
use prose_store::{Comment, ContentStore, LikeState, NewPost, Post};

use crate::commands::auth::register_identity;
use crate::error::Result;
use crate::events::ClientEvent;
use crate::optimistic::ReconcilePolicy;
use crate::state::AppState;

/// Like or unlike `post_id` as the signed-in identity.
///
/// The new state is applied and broadcast before the remote side is
/// asked to confirm it. Returns the state the toggle produced.
pub async fn toggle_like(state: &AppState, post_id: PostId) -> Result<LikeState> {
    let identity = state.session.require_identity()?;
    let user = identity.id;

    let (after, ticket, author) = {
        let mut store = state.content();
        let (_, after) = store.toggle_like(post_id, user)?;
        let ticket = state.likes_pending.begin((user, post_id));
        (after, ticket, store.get_post(post_id, None)?.author)
    };
    sync_author_likes(state, &author);
    state.events.emit(ClientEvent::PostUpdated {
        post_id,
        like: after,
    });

    let mutation = if after.is_liked {
        ContentMutation::Like {
            post_id,
            user_id: user,
        }
    } else {
        ContentMutation::Unlike {
            post_id,
            user_id: user,
        }
    };
    let kind = mutation.kind();

    let outcome = state.content_service.confirm(mutation).await;
    let err = match outcome {
        Ok(()) => {
            state.likes_pending.finish(&ticket);
            debug!(post = %post_id, user = %user, kind, "Like confirmed");
            return Ok(after);
        }
        Err(e) => e,
    };

    match state.reconcile {
        ReconcilePolicy::FireAndForget => {
            state.likes_pending.finish(&ticket);
            warn!(post = %post_id, user = %user, kind, error = %err, "Like not confirmed, keeping local state");
            Ok(after)
        }
        ReconcilePolicy::Rollback => {
            let restored = {
                let mut store = state.content();
                let undone = if state.likes_pending.finish(&ticket) {
                    undo_toggle(&mut store, post_id, user, after)?
                } else {
                    None
                };
                match undone {
                    Some(like) => Some((like, store.get_post(post_id, None)?.author)),
                    None => None,
                }
            };

            match restored {
                Some((like, author)) => {
                    sync_author_likes(state, &author);
                    warn!(post = %post_id, user = %user, kind, error = %err, "Like not confirmed, rolled back");
                    state.events.emit(ClientEvent::PostUpdated { post_id, like });
                    state.events.emit(ClientEvent::MutationFailed {
                        kind,
                        post_id,
                        message: err.to_string(),
                    });
                }
                None => {
                    debug!(post = %post_id, user = %user, kind, error = %err, "Like failed but was superseded");
                }
            }
            Err(err.into())
        }
    }
}

/// Carry the author's received-likes total into the session when the
/// signed-in identity wrote the post.
fn sync_author_likes(state: &AppState, author: &Identity) {
    state
        .session
        .update_identity(author.id, |i| i.likes_count = author.likes_count);
}

/// Flip the like back if the stored flag still shows `applied`. The
/// counter moves relative to its current value.
fn undo_toggle(
    store: &mut ContentStore,
    post_id: PostId,
    user: UserId,
    applied: LikeState,
) -> Result<Option<LikeState>> {
    let current = store.like_state(post_id, user)?;
    if current.is_liked != applied.is_liked {
        return Ok(None);
    }
    let (_, restored) = store.toggle_like(post_id, user)?;
    Ok(Some(restored))
}

/// Publish a new post as the signed-in identity.
///
/// Not optimistic: the post only appears once the remote side has
/// confirmed it.
pub async fn publish_post(state: &AppState, content: &str) -> Result<Post> {
    let identity = state.session.require_identity()?;
    validate_post_content(content)?;

    let new_post = NewPost::new(identity.id, content);
    let post_id = new_post.id;
    info!(post = %post_id, author = %identity.id, chars = char_count(content), "Publishing post");

    let mutation = ContentMutation::Publish {
        post_id,
        author_id: identity.id,
        content: new_post.content.clone(),
    };
    if let Err(e) = state.content_service.confirm(mutation).await {
        warn!(post = %post_id, author = %identity.id, error = %e, "Publish failed");
        state.events.emit(ClientEvent::MutationFailed {
            kind: "publish",
            post_id,
            message: e.to_string(),
        });
        return Err(e.into());
    }

    let post = {
        let mut store = state.content();
        register_identity(&mut store, &identity);
        store.update_user(identity.id, |u| u.posts_count += 1)?;
        store.insert_post(new_post)?
    };
    state
        .session
        .update_identity(identity.id, |i| i.posts_count += 1);

    info!(post = %post.id, author = %post.author.username, "Post published");
    state.events.emit(ClientEvent::PostPublished { post: post.clone() });
    Ok(post)
}

/// Every post, newest first, as seen by the current session.
pub fn feed(state: &AppState) -> Result<Vec<Post>> {
    let viewer = state.session.current_session().user_id();
    Ok(state.content().list_posts(viewer)?)
}

/// A post with its comments, oldest comment first.
pub fn post_detail(state: &AppState, post_id: PostId) -> Result<(Post, Vec<Comment>)> {
    let viewer = state.session.current_session().user_id();
    let store = state.content();
    let post = store.get_post(post_id, viewer)?;
    let comments = store.comments_for_post(post_id)?;
    Ok((post, comments))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prose_remote::fakes::FakeBackend;

    use super::*;
    use crate::commands::auth;
    use crate::commands::test_support::state_with_post;
    use crate::error::ClientError;

    async fn signed_in(
        reconcile: ReconcilePolicy,
        likes: u64,
        fake: &FakeBackend,
    ) -> (Arc<AppState>, PostId, UserId) {
        let (state, post_id) = state_with_post(fake, reconcile, likes);
        let session = auth::sign_up(&state, "ada", "ada@example.com", "pw")
            .await
            .unwrap();
        let user = session.user_id().unwrap();
        (Arc::new(state), post_id, user)
    }

    fn like_of(state: &AppState, post_id: PostId, user: UserId) -> LikeState {
        state.content().like_state(post_id, user).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_twice_round_trips() {
        let fake = FakeBackend::new();
        let (state, post_id, user) = signed_in(ReconcilePolicy::Rollback, 3, &fake).await;

        assert_eq!(
            toggle_like(&state, post_id).await.unwrap(),
            LikeState::new(true, 4)
        );
        assert_eq!(
            toggle_like(&state, post_id).await.unwrap(),
            LikeState::new(false, 3)
        );
        assert_eq!(like_of(&state, post_id, user), LikeState::new(false, 3));

        let kinds: Vec<_> = fake.mutations().iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec!["like", "unlike"]);
    }

    #[tokio::test]
    async fn test_toggle_requires_session() {
        let fake = FakeBackend::new();
        let (state, post_id) = state_with_post(&fake, ReconcilePolicy::Rollback, 3);

        let err = toggle_like(&state, post_id).await.unwrap_err();
        assert_eq!(err, ClientError::Unauthorized);
        let post = state.content().get_post(post_id, None).unwrap();
        assert_eq!(post.likes_count, 3);
        assert_eq!(fake.confirm_calls(), 0);
    }

    #[tokio::test]
    async fn test_toggle_unknown_post() {
        let fake = FakeBackend::new();
        let (state, _, _) = signed_in(ReconcilePolicy::Rollback, 0, &fake).await;
        let err = toggle_like(&state, PostId::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(fake.confirm_calls(), 0);
    }

    #[tokio::test]
    async fn test_optimistic_value_visible_before_confirmation() {
        let fake = FakeBackend::gated();
        let (state, post_id, user) = signed_in(ReconcilePolicy::Rollback, 3, &fake).await;

        let task = {
            let state = state.clone();
            tokio::spawn(async move { toggle_like(&state, post_id).await })
        };
        fake.wait_for_confirms(1).await;

        assert_eq!(like_of(&state, post_id, user), LikeState::new(true, 4));
        assert!(state.likes_pending.is_pending(&(user, post_id)));

        fake.release(1);
        assert_eq!(task.await.unwrap().unwrap(), LikeState::new(true, 4));
        assert!(!state.likes_pending.is_pending(&(user, post_id)));
    }

    #[tokio::test]
    async fn test_failed_like_rolls_back() {
        let fake = FakeBackend::new();
        let (state, post_id, user) = signed_in(ReconcilePolicy::Rollback, 3, &fake).await;
        let mut events = state.events.subscribe();
        fake.fail_next_confirms(1);

        let err = toggle_like(&state, post_id).await.unwrap_err();
        assert!(matches!(err, ClientError::RemoteFailure(_)));
        assert_eq!(like_of(&state, post_id, user), LikeState::new(false, 3));

        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::PostUpdated {
                post_id,
                like: LikeState::new(true, 4)
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::PostUpdated {
                post_id,
                like: LikeState::new(false, 3)
            }
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            ClientEvent::MutationFailed { kind: "like", .. }
        ));
    }

    #[tokio::test]
    async fn test_fire_and_forget_keeps_value() {
        let fake = FakeBackend::new();
        let (state, post_id, user) = signed_in(ReconcilePolicy::FireAndForget, 3, &fake).await;
        fake.fail_next_confirms(1);

        assert_eq!(
            toggle_like(&state, post_id).await.unwrap(),
            LikeState::new(true, 4)
        );
        assert_eq!(like_of(&state, post_id, user), LikeState::new(true, 4));
    }

    #[tokio::test]
    async fn test_liking_own_post_moves_session_total() {
        let fake = FakeBackend::new();
        let (state, _, user) = signed_in(ReconcilePolicy::Rollback, 0, &fake).await;
        let own = publish_post(&state, "my own words").await.unwrap();
        let session_likes = || {
            state
                .session
                .current_session()
                .identity()
                .map(|i| i.likes_count)
        };

        toggle_like(&state, own.id).await.unwrap();
        assert_eq!(session_likes(), Some(1));
        assert_eq!(state.content().get_user(user).unwrap().likes_count, 1);

        fake.fail_next_confirms(1);
        toggle_like(&state, own.id).await.unwrap_err();
        assert_eq!(session_likes(), Some(1));
        assert_eq!(state.content().get_user(user).unwrap().likes_count, 1);

        toggle_like(&state, own.id).await.unwrap();
        assert_eq!(session_likes(), Some(0));
    }

    #[tokio::test]
    async fn test_superseded_failure_keeps_newest_value() {
        let fake = FakeBackend::gated();
        let (state, post_id, user) = signed_in(ReconcilePolicy::Rollback, 3, &fake).await;
        fake.fail_next_confirms(1);

        let spawn_toggle = |state: Arc<AppState>| {
            tokio::spawn(async move { toggle_like(&state, post_id).await })
        };

        let first = spawn_toggle(state.clone());
        fake.wait_for_confirms(1).await;
        let second = spawn_toggle(state.clone());
        fake.wait_for_confirms(2).await;
        let third = spawn_toggle(state.clone());
        fake.wait_for_confirms(3).await;
        assert_eq!(like_of(&state, post_id, user), LikeState::new(true, 4));

        fake.release(1);
        assert!(first.await.unwrap().is_err());
        assert_eq!(like_of(&state, post_id, user), LikeState::new(true, 4));

        fake.release(2);
        assert_eq!(second.await.unwrap().unwrap(), LikeState::new(false, 3));
        assert_eq!(third.await.unwrap().unwrap(), LikeState::new(true, 4));
        assert_eq!(like_of(&state, post_id, user), LikeState::new(true, 4));
    }

    #[tokio::test]
    async fn test_publish_length_policy() {
        let fake = FakeBackend::new();
        let (state, _, _) = signed_in(ReconcilePolicy::Rollback, 0, &fake).await;

        assert!(matches!(
            publish_post(&state, "").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            publish_post(&state, &"x".repeat(501)).await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(fake.confirm_calls(), 0);

        let post = publish_post(&state, &"x".repeat(500)).await.unwrap();
        assert_eq!(post.content.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_publish_puts_post_on_top() {
        let fake = FakeBackend::new();
        let (state, _, user) = signed_in(ReconcilePolicy::Rollback, 0, &fake).await;
        let mut events = state.events.subscribe();

        let post = publish_post(&state, "first words").await.unwrap();
        let feed = feed(&state).unwrap();
        assert_eq!(feed[0].id, post.id);
        assert_eq!(feed.len(), 2);

        assert_eq!(state.content().get_user(user).unwrap().posts_count, 1);
        let session = state.session.current_session();
        assert_eq!(session.identity().unwrap().posts_count, 1);
        assert!(matches!(
            events.recv().await.unwrap(),
            ClientEvent::PostPublished { .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_publish_inserts_nothing() {
        let fake = FakeBackend::new();
        let (state, _, _) = signed_in(ReconcilePolicy::Rollback, 0, &fake).await;
        fake.fail_next_confirms(1);

        let err = publish_post(&state, "lost words").await.unwrap_err();
        assert!(matches!(err, ClientError::RemoteFailure(_)));
        assert_eq!(feed(&state).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_detail_not_found() {
        let fake = FakeBackend::new();
        let (state, post_id) = state_with_post(&fake, ReconcilePolicy::Rollback, 0);

        let (post, comments) = post_detail(&state, post_id).unwrap();
        assert_eq!(post.id, post_id);
        assert!(comments.is_empty());
        assert!(matches!(
            post_detail(&state, PostId::new()),
            Err(ClientError::NotFound(_))
        ));
    }
}
