//! Application state shared by every command.
//!
//! The [`AppState`] is wrapped in an `Arc` by [`crate::ProseClient`] so
//! clones of the client share one session, one content store, and one
//! event bus.

use std::sync::{Arc, Mutex, MutexGuard};

use prose_remote::ContentService;
use prose_shared::{PostId, UserId};
use prose_store::ContentStore;

use crate::events::EventBus;
use crate::optimistic::{PendingMutations, ReconcilePolicy};
use crate::session::SessionStore;

/// Central application state.
pub struct AppState {
    /// Current session and the identity service behind it.
    pub session: SessionStore,

    /// Posts, comments, likes, and the user directory.
    /// Never locked across an `.await`.
    pub content: Mutex<ContentStore>,

    /// In-flight like toggles, keyed by `(actor, post)`.
    pub likes_pending: PendingMutations<(UserId, PostId)>,

    pub events: EventBus,

    /// Remote side that confirms content mutations.
    pub content_service: Arc<dyn ContentService>,

    pub reconcile: ReconcilePolicy,
}

impl AppState {
    pub fn new(
        session: SessionStore,
        content: ContentStore,
        content_service: Arc<dyn ContentService>,
        events: EventBus,
        reconcile: ReconcilePolicy,
    ) -> Self {
        Self {
            session,
            content: Mutex::new(content),
            likes_pending: PendingMutations::new(),
            events,
            content_service,
            reconcile,
        }
    }

    /// Lock the content store. A panic in another holder leaves the
    /// store consistent because every write is a single call, so a
    /// poisoned lock is recovered.
    pub fn content(&self) -> MutexGuard<'_, ContentStore> {
        match self.content.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
