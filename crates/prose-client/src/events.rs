use serde::Serialize;
use tokio::sync::broadcast;

use prose_shared::{CommentId, PostId};
use prose_store::{Comment, LikeState, Post};

pub const EVENT_POST_UPDATED: &str = "post-updated";
pub const EVENT_COMMENT_ADDED: &str = "comment-added";
pub const EVENT_COMMENT_REMOVED: &str = "comment-removed";
pub const EVENT_POST_PUBLISHED: &str = "post-published";
pub const EVENT_MUTATION_FAILED: &str = "mutation-failed";

/// Content change notifications for the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    /// The acting identity's like state on a post changed.
    #[serde(rename_all = "camelCase")]
    PostUpdated { post_id: PostId, like: LikeState },
    CommentAdded { comment: Comment },
    /// An optimistic comment was withdrawn after a failed confirmation.
    #[serde(rename_all = "camelCase")]
    CommentRemoved {
        post_id: PostId,
        comment_id: CommentId,
    },
    PostPublished { post: Post },
    #[serde(rename_all = "camelCase")]
    MutationFailed {
        kind: &'static str,
        post_id: PostId,
        message: String,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::PostUpdated { .. } => EVENT_POST_UPDATED,
            ClientEvent::CommentAdded { .. } => EVENT_COMMENT_ADDED,
            ClientEvent::CommentRemoved { .. } => EVENT_COMMENT_REMOVED,
            ClientEvent::PostPublished { .. } => EVENT_POST_PUBLISHED,
            ClientEvent::MutationFailed { .. } => EVENT_MUTATION_FAILED,
        }
    }
}

/// Fan-out of [`ClientEvent`]s. Slow receivers lag and lose the oldest
/// events instead of blocking emitters.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ClientEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            tracing::debug!(event = name, "No event subscribers");
        }
    }
}
