//! # prose-client
//!
//! Client-side core of Prose: the session store, optimistic like and
//! comment handling, publishing, and the feed/profile/post reads a
//! presentation layer needs. Everything runs against in-memory content
//! and an injectable remote (see `prose-remote`).

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod optimistic;
pub mod session;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use client::ProseClient;
pub use commands::compose::Draft;
pub use commands::profile::Profile;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::{ClientEvent, EventBus};
pub use optimistic::ReconcilePolicy;
pub use session::{Session, SessionStatus, SessionStore, SessionWatcher};

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default filter. Calling it again is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("prose_client=debug,prose_store=info,prose_remote=info,warn")
    });

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Tracing initialised for {}", prose_shared::constants::APP_NAME);
    }
}
