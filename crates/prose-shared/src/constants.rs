/// Application name
pub const APP_NAME: &str = "Prose";

/// Maximum post length in characters (Unicode scalar values)
pub const MAX_POST_LENGTH: usize = 500;

/// Remaining-character count at or below which the composer warns
pub const NEAR_LIMIT_THRESHOLD: usize = 50;

/// Simulated latency of a sign-in / sign-up round trip, in milliseconds
pub const DEFAULT_AUTH_DELAY_MS: u64 = 800;

/// Simulated latency of publishing a post, in milliseconds
pub const DEFAULT_PUBLISH_DELAY_MS: u64 = 1000;

/// Simulated latency of submitting a comment, in milliseconds
pub const DEFAULT_COMMENT_DELAY_MS: u64 = 500;

/// Simulated latency of confirming a like / unlike, in milliseconds
pub const DEFAULT_LIKE_DELAY_MS: u64 = 300;

/// Buffered client events per subscriber before lagging ones drop events
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Bio given to freshly signed-up identities
pub const DEFAULT_BIO: &str = "";
