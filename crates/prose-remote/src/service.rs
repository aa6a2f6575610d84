//! Ports to the remote side.
//!
//! The client only ever talks to these traits, so a real backend can
//! replace [`crate::SimulatedBackend`] without touching the session store
//! or the mutation layer. Tests plug in deterministic fakes.

use async_trait::async_trait;

use prose_shared::{Identity, RemoteError};

use crate::messages::{AuthRequest, ContentMutation};

/// Credential verification and account creation.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve a credential tuple to an identity.
    ///
    /// Returns [`RemoteError::Rejected`] when the credentials are refused
    /// and [`RemoteError::Unavailable`] when the service cannot answer.
    async fn authenticate(&self, request: AuthRequest) -> Result<Identity, RemoteError>;
}

/// Persistence of content changes.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Persist `mutation`. Resolves once the remote side has accepted or
    /// refused it.
    async fn confirm(&self, mutation: ContentMutation) -> Result<(), RemoteError>;
}
