// Remote collaborator layer: the ports the client talks to and a
// timer-driven simulated backend that implements them.

#[cfg(any(test, feature = "testing"))]
pub mod fakes;
pub mod messages;
pub mod service;
pub mod simulated;

pub use messages::{AuthRequest, ContentMutation};
pub use service::{ContentService, IdentityService};
pub use simulated::{BackendConfig, SimulatedBackend};
