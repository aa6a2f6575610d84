use thiserror::Error;

/// Failure reported by a remote collaborator (identity or content service).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service understood the request and refused it
    /// (e.g. unknown credentials).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The service could not be reached or failed to process the request.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Post content that violates the publishing policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("Content is empty")]
    Empty,

    #[error("Content too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },
}
