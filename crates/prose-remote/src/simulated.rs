//! Timer-driven stand-in for a real backend.
//!
//! Every call sleeps for a fixed, per-operation delay and then succeeds,
//! unless a failure rate is configured. Sign-ins are matched by email
//! against an in-memory account directory; unknown emails get a freshly
//! constructed identity unless `allow_unknown_sign_in` is off.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info, warn};

use prose_shared::constants::{
    DEFAULT_AUTH_DELAY_MS, DEFAULT_COMMENT_DELAY_MS, DEFAULT_LIKE_DELAY_MS,
    DEFAULT_PUBLISH_DELAY_MS,
};
use prose_shared::{Identity, RemoteError};

use crate::messages::{AuthRequest, ContentMutation};
use crate::service::{ContentService, IdentityService};

/// Tuning knobs for the simulated backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Latency of sign-in / sign-up.
    pub auth_delay: Duration,
    /// Latency of publishing a post.
    pub publish_delay: Duration,
    /// Latency of submitting a comment.
    pub comment_delay: Duration,
    /// Latency of confirming a like or unlike.
    pub like_delay: Duration,
    /// Probability in `[0, 1]` that any call fails with
    /// [`RemoteError::Unavailable`].
    pub failure_rate: f64,
    /// Whether a sign-in with an unknown email creates an account on the fly.
    pub allow_unknown_sign_in: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            auth_delay: Duration::from_millis(DEFAULT_AUTH_DELAY_MS),
            publish_delay: Duration::from_millis(DEFAULT_PUBLISH_DELAY_MS),
            comment_delay: Duration::from_millis(DEFAULT_COMMENT_DELAY_MS),
            like_delay: Duration::from_millis(DEFAULT_LIKE_DELAY_MS),
            failure_rate: 0.0,
            allow_unknown_sign_in: true,
        }
    }
}

impl BackendConfig {
    /// Same behaviour with every delay set to zero.
    pub fn instant() -> Self {
        Self {
            auth_delay: Duration::ZERO,
            publish_delay: Duration::ZERO,
            comment_delay: Duration::ZERO,
            like_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Simulated identity and content service.
#[derive(Clone)]
pub struct SimulatedBackend {
    /// Accounts keyed by lowercased email.
    accounts: Arc<Mutex<HashMap<String, Identity>>>,
    config: BackendConfig,
}

impl SimulatedBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Create a backend that already knows `accounts`.
    pub fn with_accounts(config: BackendConfig, accounts: impl IntoIterator<Item = Identity>) -> Self {
        let backend = Self::new(config);
        if let Ok(mut map) = backend.accounts.lock() {
            for identity in accounts {
                map.insert(identity.email.to_lowercase(), identity);
            }
        }
        backend
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn roll_failure(&self) -> bool {
        let rate = self.config.failure_rate.clamp(0.0, 1.0);
        rate > 0.0 && rand::thread_rng().gen_bool(rate)
    }

    fn resolve(&self, request: &AuthRequest) -> Result<Identity, RemoteError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| RemoteError::Unavailable(format!("Lock poisoned: {e}")))?;
        let key = request.email().trim().to_lowercase();

        match request {
            AuthRequest::SignIn { email, .. } => {
                if let Some(identity) = accounts.get(&key) {
                    return Ok(identity.clone());
                }
                if !self.config.allow_unknown_sign_in {
                    return Err(RemoteError::Rejected("unknown account".into()));
                }
                let identity = Identity::from_email(email.trim());
                info!(user = %identity.id, "creating account for unknown sign-in");
                accounts.insert(key, identity.clone());
                Ok(identity)
            }
            AuthRequest::SignUp {
                username, email, ..
            } => {
                if accounts.contains_key(&key) {
                    return Err(RemoteError::Rejected("email already registered".into()));
                }
                let identity = Identity::new(username.trim(), email.trim());
                accounts.insert(key, identity.clone());
                Ok(identity)
            }
        }
    }

    fn delay_for(&self, mutation: &ContentMutation) -> Duration {
        match mutation {
            ContentMutation::Like { .. } | ContentMutation::Unlike { .. } => self.config.like_delay,
            ContentMutation::Comment { .. } => self.config.comment_delay,
            ContentMutation::Publish { .. } => self.config.publish_delay,
        }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

#[async_trait]
impl IdentityService for SimulatedBackend {
    async fn authenticate(&self, request: AuthRequest) -> Result<Identity, RemoteError> {
        debug!(kind = request.kind(), email = %request.email(), "simulating auth round trip");
        let fail = self.roll_failure();
        tokio::time::sleep(self.config.auth_delay).await;

        if fail {
            warn!(kind = request.kind(), "simulated auth failure");
            return Err(RemoteError::Unavailable("simulated outage".into()));
        }
        self.resolve(&request)
    }
}

#[async_trait]
impl ContentService for SimulatedBackend {
    async fn confirm(&self, mutation: ContentMutation) -> Result<(), RemoteError> {
        debug!(kind = mutation.kind(), post = %mutation.post_id(), "simulating confirmation");
        let fail = self.roll_failure();
        tokio::time::sleep(self.delay_for(&mutation)).await;

        if fail {
            warn!(kind = mutation.kind(), post = %mutation.post_id(), "simulated confirmation failure");
            return Err(RemoteError::Unavailable("simulated outage".into()));
        }
        Ok(())
    }
}
