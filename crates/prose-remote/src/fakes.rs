//! Deterministic remote doubles for tests.
//!
//! [`FakeBackend`] answers instantly, records every call, and can be
//! scripted to fail or to hold confirmations until released.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use prose_shared::{Identity, RemoteError};

use crate::messages::{AuthRequest, ContentMutation};
use crate::service::{ContentService, IdentityService};

#[derive(Default)]
struct FakeState {
    accounts: HashMap<String, Identity>,
    auth_script: VecDeque<Result<Identity, RemoteError>>,
    confirm_script: VecDeque<Result<(), RemoteError>>,
    auth_requests: Vec<AuthRequest>,
    mutations: Vec<ContentMutation>,
}

/// Scriptable in-memory remote.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    gate: Option<Arc<Semaphore>>,
    auth_gate: Option<Arc<Semaphore>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose confirmations block until [`FakeBackend::release`]
    /// hands out permits.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Hold `authenticate` calls until [`FakeBackend::release_auth`].
    pub fn hold_auth(mut self) -> Self {
        self.auth_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release_auth(&self, n: usize) {
        if let Some(gate) = &self.auth_gate {
            gate.add_permits(n);
        }
    }

    /// Let `n` held confirmations complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Queue the outcome of the next `authenticate` call.
    pub fn push_auth(&self, outcome: Result<Identity, RemoteError>) {
        self.lock().auth_script.push_back(outcome);
    }

    /// Queue the outcome of the next `confirm` call.
    pub fn push_confirm(&self, outcome: Result<(), RemoteError>) {
        self.lock().confirm_script.push_back(outcome);
    }

    /// Make every following `confirm` fail until the script is exhausted.
    pub fn fail_next_confirms(&self, n: usize) {
        let mut state = self.lock();
        for _ in 0..n {
            state
                .confirm_script
                .push_back(Err(RemoteError::Unavailable("scripted failure".into())));
        }
    }

    pub fn auth_calls(&self) -> usize {
        self.lock().auth_requests.len()
    }

    pub fn confirm_calls(&self) -> usize {
        self.lock().mutations.len()
    }

    pub fn mutations(&self) -> Vec<ContentMutation> {
        self.lock().mutations.clone()
    }

    /// Yield until at least `n` confirmations have been requested.
    pub async fn wait_for_confirms(&self, n: usize) {
        while self.confirm_calls() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Yield until at least `n` authentications have been requested.
    pub async fn wait_for_auths(&self, n: usize) {
        while self.auth_calls() < n {
            tokio::task::yield_now().await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn default_identity(state: &mut FakeState, request: &AuthRequest) -> Identity {
        let key = request.email().to_lowercase();
        if let Some(identity) = state.accounts.get(&key) {
            return identity.clone();
        }
        let identity = match request {
            AuthRequest::SignIn { email, .. } => Identity::from_email(email),
            AuthRequest::SignUp {
                username, email, ..
            } => Identity::new(username.as_str(), email.as_str()),
        };
        state.accounts.insert(key, identity.clone());
        identity
    }
}

#[async_trait]
impl IdentityService for FakeBackend {
    async fn authenticate(&self, request: AuthRequest) -> Result<Identity, RemoteError> {
        let outcome = {
            let mut state = self.lock();
            state.auth_requests.push(request.clone());
            match state.auth_script.pop_front() {
                Some(scripted) => scripted,
                None => Ok(Self::default_identity(&mut state, &request)),
            }
        };
        // Give callers a chance to observe the in-flight state.
        match &self.auth_gate {
            Some(gate) => {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            None => tokio::task::yield_now().await,
        }
        outcome
    }
}

#[async_trait]
impl ContentService for FakeBackend {
    async fn confirm(&self, mutation: ContentMutation) -> Result<(), RemoteError> {
        let outcome = {
            let mut state = self.lock();
            state.mutations.push(mutation);
            state.confirm_script.pop_front().unwrap_or(Ok(()))
        };
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        outcome
    }
}
