//! # prose-store
//!
//! In-memory content storage for the Prose client.
//!
//! Nothing is persisted: the store lives for as long as the client and is
//! optionally seeded with fixture data at startup. The crate exposes a
//! synchronous [`ContentStore`] with typed helpers for posts, comments,
//! likes, and the user directory. Callers that share it across tasks wrap
//! it in a mutex and take snapshots out of it.

pub mod comments;
pub mod fixtures;
pub mod models;
pub mod posts;
pub mod reactions;
pub mod store;
pub mod users;

mod error;

pub use error::{Result, StoreError};
pub use models::*;
pub use store::ContentStore;
