//! Command handlers called by [`crate::ProseClient`].
//!
//! Each sub-module groups related commands by domain. Handlers take the
//! shared [`crate::state::AppState`] by reference and return
//! [`crate::error::Result`].

pub mod auth;
pub mod comments;
pub mod compose;
pub mod posts;
pub mod profile;
