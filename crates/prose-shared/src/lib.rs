//! # prose-shared
//!
//! Types shared by every Prose crate: strongly-typed ids, the user
//! identity profile, content policy helpers, and the error enums that
//! cross crate boundaries.

pub mod constants;
pub mod content;
pub mod error;
pub mod identity;
pub mod types;

pub use error::{ContentError, RemoteError};
pub use identity::Identity;
pub use types::{CommentId, PostId, UserId};
