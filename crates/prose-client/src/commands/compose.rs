use serde::Serialize;

use prose_shared::content::{char_count, is_near_limit, remaining_chars, validate_post_content};

use crate::state::AppState;

/// What the composer shows while a post is being written.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub chars: usize,
    /// Negative once the draft is over the limit.
    pub remaining: i64,
    pub near_limit: bool,
    /// Signed in and the content would pass validation.
    pub can_publish: bool,
    /// Avatar initial of the signed-in identity.
    pub author_initial: Option<String>,
}

/// Describe `content` as a draft for the current session. Nothing is
/// stored or sent.
pub fn draft(state: &AppState, content: &str) -> Draft {
    let session = state.session.current_session();
    let author = session.identity();
    Draft {
        chars: char_count(content),
        remaining: remaining_chars(content),
        near_limit: is_near_limit(content),
        can_publish: author.is_some() && validate_post_content(content).is_ok(),
        author_initial: author.map(|identity| identity.initial()),
    }
}
