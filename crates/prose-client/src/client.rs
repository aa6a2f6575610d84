use std::sync::{Arc, MutexGuard};

use tokio::sync::broadcast;
use tracing::info;

use prose_remote::{ContentService, IdentityService, SimulatedBackend};
use prose_shared::PostId;
use prose_store::{Comment, ContentStore, LikeState, Post};

use crate::commands;
use crate::commands::compose::Draft;
use crate::commands::profile::Profile;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::{ClientEvent, EventBus};
use crate::session::{Session, SessionStore, SessionWatcher};
use crate::state::AppState;

/// Entry point for a presentation layer.
///
/// Cheap to clone; every clone talks to the same session and content.
#[derive(Clone)]
pub struct ProseClient {
    state: Arc<AppState>,
}

impl ProseClient {
    /// Client backed by the simulated remote. Fixture users can sign in
    /// with their email and any password.
    pub fn new(config: ClientConfig) -> Self {
        let store = initial_store(&config);
        let backend = Arc::new(SimulatedBackend::with_accounts(
            config.backend(),
            store.list_users(),
        ));
        info!(
            accounts = backend.account_count(),
            posts = store.post_count(),
            reconcile = ?config.reconcile,
            "Starting Prose client"
        );
        Self::build(config, store, backend.clone(), backend)
    }

    /// Client talking to the given remote services.
    pub fn with_services(
        config: ClientConfig,
        identity: Arc<dyn IdentityService>,
        content: Arc<dyn ContentService>,
    ) -> Self {
        let store = initial_store(&config);
        Self::build(config, store, identity, content)
    }

    fn build(
        config: ClientConfig,
        store: ContentStore,
        identity: Arc<dyn IdentityService>,
        content: Arc<dyn ContentService>,
    ) -> Self {
        let state = AppState::new(
            SessionStore::new(identity),
            store,
            content,
            EventBus::new(config.event_capacity),
            config.reconcile,
        );
        Self {
            state: Arc::new(state),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        commands::auth::sign_in(&self.state, email, password).await
    }

    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<Session> {
        commands::auth::sign_up(&self.state, username, email, password).await
    }

    pub fn sign_out(&self) -> Session {
        commands::auth::sign_out(&self.state)
    }

    pub fn current_session(&self) -> Session {
        self.state.session.current_session()
    }

    pub fn subscribe_session(&self) -> SessionWatcher {
        self.state.session.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.state.events.subscribe()
    }

    pub async fn toggle_like(&self, post_id: PostId) -> Result<LikeState> {
        commands::posts::toggle_like(&self.state, post_id).await
    }

    pub async fn submit_comment(&self, post_id: PostId, content: &str) -> Result<Comment> {
        commands::comments::submit_comment(&self.state, post_id, content).await
    }

    pub async fn publish_post(&self, content: &str) -> Result<Post> {
        commands::posts::publish_post(&self.state, content).await
    }

    /// Composer state for `content`; nothing is published.
    pub fn draft(&self, content: &str) -> Draft {
        commands::compose::draft(&self.state, content)
    }

    pub fn feed(&self) -> Result<Vec<Post>> {
        commands::posts::feed(&self.state)
    }

    pub fn post_detail(&self, post_id: PostId) -> Result<(Post, Vec<Comment>)> {
        commands::posts::post_detail(&self.state, post_id)
    }

    pub fn profile(&self, username: &str) -> Result<Profile> {
        commands::profile::profile(&self.state, username)
    }

    /// Direct access to the content store, e.g. to add content outside
    /// the command flow. Do not hold the guard across an `.await`.
    pub fn content(&self) -> MutexGuard<'_, ContentStore> {
        self.state.content()
    }
}

fn initial_store(config: &ClientConfig) -> ContentStore {
    if config.seed_fixtures {
        ContentStore::with_fixtures()
    } else {
        ContentStore::new()
    }
}
