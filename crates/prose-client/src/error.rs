use thiserror::Error;

use prose_shared::{ContentError, RemoteError};
use prose_store::StoreError;

/// Errors surfaced to the presentation layer. Every variant is
/// recoverable; none of them should end the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A required field is missing or malformed. Re-prompt the user.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The identity service refused the credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The action needs a signed-in session. Redirect to sign-in.
    #[error("Sign in required")]
    Unauthorized,

    /// The remote side failed to confirm a change.
    #[error("Remote failure: {0}")]
    RemoteFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for ClientError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ClientError::NotFound(what),
            StoreError::Duplicate(what) => ClientError::Validation(format!("duplicate {what}")),
        }
    }
}

impl From<ContentError> for ClientError {
    fn from(e: ContentError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

// Outside the auth path a rejection is a failed confirmation, not a
// credentials problem; the session store maps `Rejected` itself.
impl From<RemoteError> for ClientError {
    fn from(e: RemoteError) -> Self {
        ClientError::RemoteFailure(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
