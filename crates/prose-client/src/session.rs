//! Session store: who is using the client right now.
//!
//! The [`SessionStore`] owns the single [`Session`] of a running client and
//! publishes every settled transition through a `tokio::sync::watch`
//! channel, so views subscribe instead of polling. It is shared by
//! reference (`Arc`) with whatever needs it; there is no global instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use prose_remote::{AuthRequest, IdentityService};
use prose_shared::{Identity, RemoteError, UserId};

use crate::error::{ClientError, Result};

/// Authentication status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Snapshot of the session.
///
/// The fields are private so that `status == Authenticated` holds exactly
/// when an identity is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    identity: Option<Identity>,
    status: SessionStatus,
}

impl Session {
    pub fn unauthenticated() -> Self {
        Self {
            identity: None,
            status: SessionStatus::Unauthenticated,
        }
    }

    pub fn authenticating() -> Self {
        Self {
            identity: None,
            status: SessionStatus::Authenticating,
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            status: SessionStatus::Authenticated,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Authenticating
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity.as_ref().map(|i| i.id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

/// Receiver half handed to subscribers.
pub type SessionWatcher = watch::Receiver<Session>;

/// Holds the current session and runs sign-in / sign-up / sign-out.
pub struct SessionStore {
    tx: watch::Sender<Session>,
    identity_service: Arc<dyn IdentityService>,
    /// Bumped by every sign-out; an attempt that started under an older
    /// epoch does not get to attach its identity.
    epoch: AtomicU64,
}

impl SessionStore {
    /// Create a store in the unauthenticated state.
    pub fn new(identity_service: Arc<dyn IdentityService>) -> Self {
        let (tx, _rx) = watch::channel(Session::unauthenticated());
        Self {
            tx,
            identity_service,
            epoch: AtomicU64::new(0),
        }
    }

    /// Current session snapshot.
    pub fn current_session(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Subscribe to session transitions. The receiver starts at the
    /// current value.
    pub fn subscribe(&self) -> SessionWatcher {
        self.tx.subscribe()
    }

    /// The signed-in identity, or [`ClientError::Unauthorized`].
    pub fn require_identity(&self) -> Result<Identity> {
        self.tx
            .borrow()
            .identity()
            .cloned()
            .ok_or(ClientError::Unauthorized)
    }

    /// Sign in with existing credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        require_field("email", email)?;
        require_field("password", password)?;

        self.authenticate(AuthRequest::SignIn {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// Create an account and sign into it.
    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<Session> {
        require_field("username", username)?;
        require_field("email", email)?;
        require_field("password", password)?;

        self.authenticate(AuthRequest::SignUp {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// End the session. Calling it while already signed out changes
    /// nothing and notifies no one.
    pub fn sign_out(&self) -> Session {
        let changed = self.tx.send_if_modified(|session| {
            if session.status == SessionStatus::Unauthenticated {
                return false;
            }
            *session = Session::unauthenticated();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            true
        });

        if changed {
            info!("Signed out");
        } else {
            debug!("Sign-out while already signed out");
        }
        self.current_session()
    }

    /// Apply `f` to the signed-in identity if it is `user`. Subscribers are
    /// notified only when something was updated.
    pub fn update_identity(&self, user: UserId, f: impl FnOnce(&mut Identity)) -> bool {
        self.tx.send_if_modified(|session| match session.identity.as_mut() {
            Some(identity) if identity.id == user => {
                f(identity);
                true
            }
            _ => false,
        })
    }

    async fn authenticate(&self, request: AuthRequest) -> Result<Session> {
        // The epoch is read and bumped only while the watch value is locked.
        let mut epoch = 0;
        let started = self.tx.send_if_modified(|session| {
            if session.status != SessionStatus::Unauthenticated {
                return false;
            }
            *session = Session::authenticating();
            epoch = self.epoch.load(Ordering::SeqCst);
            true
        });
        if !started {
            debug!(kind = request.kind(), "Session already active, ignoring");
            return Ok(self.current_session());
        }

        let kind = request.kind();
        info!(kind, email = %request.email(), "Authenticating");

        let outcome = self.identity_service.authenticate(request).await;

        let mut applied = false;
        let settled = match &outcome {
            Ok(identity) => Session::authenticated(identity.clone()),
            Err(_) => Session::unauthenticated(),
        };
        self.tx.send_if_modified(|session| {
            if session.status != SessionStatus::Authenticating
                || self.epoch.load(Ordering::SeqCst) != epoch
            {
                return false;
            }
            *session = settled;
            applied = true;
            true
        });

        if !applied {
            debug!(kind, "Session changed during authentication, discarding result");
            return Ok(self.current_session());
        }

        match outcome {
            Ok(identity) => {
                info!(user = %identity.id, username = %identity.username, kind, "Signed in");
                Ok(self.current_session())
            }
            Err(RemoteError::Rejected(reason)) => {
                warn!(kind, reason = %reason, "Credentials rejected");
                Err(ClientError::InvalidCredentials)
            }
            Err(e) => {
                warn!(kind, error = %e, "Authentication failed");
                Err(ClientError::RemoteFailure(e.to_string()))
            }
        }
    }
}

fn require_field(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{name} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use prose_remote::fakes::FakeBackend;

    use super::*;

    fn store() -> (SessionStore, FakeBackend) {
        let fake = FakeBackend::new();
        (SessionStore::new(Arc::new(fake.clone())), fake)
    }

    #[test]
    fn test_starts_unauthenticated() {
        let (store, _) = store();
        let session = store.current_session();
        assert_eq!(session.status(), SessionStatus::Unauthenticated);
        assert!(session.identity().is_none());
        assert_eq!(store.require_identity(), Err(ClientError::Unauthorized));
    }

    #[tokio::test]
    async fn test_sign_up_then_current_session() {
        let (store, _) = store();
        let session = store.sign_up("ada", "ada@example.com", "pw").await.unwrap();
        assert!(session.is_authenticated());

        let current = store.current_session();
        assert_eq!(current.status(), SessionStatus::Authenticated);
        assert_eq!(current.identity().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_empty_fields_are_validation_errors() {
        let (store, fake) = store();
        assert!(matches!(
            store.sign_in("", "pw").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            store.sign_in("a@b.c", "   ").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            store.sign_up("", "a@b.c", "pw").await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(fake.auth_calls(), 0);
        assert_eq!(store.current_session(), Session::unauthenticated());
    }

    #[tokio::test]
    async fn test_rejection_is_invalid_credentials() {
        let (store, fake) = store();
        fake.push_auth(Err(RemoteError::Rejected("bad password".into())));

        let err = store.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, ClientError::InvalidCredentials);
        assert_eq!(store.current_session(), Session::unauthenticated());
    }

    #[tokio::test]
    async fn test_outage_is_remote_failure() {
        let (store, fake) = store();
        fake.push_auth(Err(RemoteError::Unavailable("down".into())));

        let err = store.sign_in("ada@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::RemoteFailure(_)));
        assert!(!store.current_session().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let (store, _) = store();
        store.sign_up("ada", "ada@example.com", "pw").await.unwrap();

        let first = store.sign_out();
        let second = store.sign_out();
        assert_eq!(first, Session::unauthenticated());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sign_in_when_signed_in_is_noop() {
        let (store, fake) = store();
        let session = store.sign_up("ada", "ada@example.com", "pw").await.unwrap();

        let again = store.sign_in("grace@example.com", "pw").await.unwrap();
        assert_eq!(again, session);
        assert_eq!(fake.auth_calls(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (store, _) = store();
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow_and_update().status(), SessionStatus::Unauthenticated);

        let store = Arc::new(store);
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.sign_in("ada@example.com", "pw").await })
        };

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().status();
        assert!(matches!(
            seen,
            SessionStatus::Authenticating | SessionStatus::Authenticated
        ));

        task.await.unwrap().unwrap();
        assert_eq!(store.current_session().status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_authenticating_is_observable() {
        let fake = FakeBackend::new().hold_auth();
        let store = Arc::new(SessionStore::new(Arc::new(fake.clone())));
        let mut rx = store.subscribe();
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.sign_in("ada@example.com", "pw").await })
        };

        fake.wait_for_auths(1).await;
        let mid = store.current_session();
        assert!(mid.is_loading());
        assert!(mid.identity().is_none());
        assert!(matches!(
            store.require_identity(),
            Err(ClientError::Unauthorized)
        ));
        assert_eq!(rx.borrow_and_update().status(), SessionStatus::Authenticating);

        fake.release_auth(1);
        task.await.unwrap().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_sign_out_during_attempt_discards_result() {
        let fake = FakeBackend::new().hold_auth();
        let store = Arc::new(SessionStore::new(Arc::new(fake.clone())));
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.sign_in("ada@example.com", "pw").await })
        };

        fake.wait_for_auths(1).await;
        store.sign_out();
        fake.release_auth(1);

        let result = task.await.unwrap().unwrap();
        assert!(!result.is_authenticated());
        assert!(!store.current_session().is_authenticated());
    }

    #[tokio::test]
    async fn test_stale_attempt_cannot_settle_newer_one() {
        let fake = FakeBackend::new().hold_auth();
        let store = Arc::new(SessionStore::new(Arc::new(fake.clone())));
        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.sign_in("old@example.com", "pw").await })
        };
        fake.wait_for_auths(1).await;
        store.sign_out();

        let second = {
            let store = store.clone();
            tokio::spawn(async move { store.sign_in("new@example.com", "pw").await })
        };
        fake.wait_for_auths(2).await;
        assert_eq!(store.current_session().status(), SessionStatus::Authenticating);

        fake.release_auth(1);
        assert!(!first.await.unwrap().unwrap().is_authenticated());
        assert_eq!(store.current_session().status(), SessionStatus::Authenticating);

        fake.release_auth(1);
        let session = second.await.unwrap().unwrap();
        assert_eq!(session.identity().unwrap().email, "new@example.com");
    }

    #[tokio::test]
    async fn test_update_identity_only_for_matching_user() {
        let (store, _) = store();
        let session = store.sign_up("ada", "ada@example.com", "pw").await.unwrap();
        let ada = session.user_id().unwrap();

        assert!(store.update_identity(ada, |i| i.posts_count += 1));
        assert!(!store.update_identity(UserId::new(), |i| i.posts_count += 1));
        assert_eq!(store.current_session().identity().unwrap().posts_count, 1);
    }
}
