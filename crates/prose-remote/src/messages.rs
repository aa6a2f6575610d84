//! Request and mutation payloads sent to the remote collaborator.

use serde::Serialize;

use prose_shared::{CommentId, PostId, UserId};

/// A credential tuple submitted for sign-in or sign-up.
#[derive(Clone)]
pub enum AuthRequest {
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        username: String,
        email: String,
        password: String,
    },
}

impl AuthRequest {
    pub fn email(&self) -> &str {
        match self {
            AuthRequest::SignIn { email, .. } | AuthRequest::SignUp { email, .. } => email,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthRequest::SignIn { .. } => "sign_in",
            AuthRequest::SignUp { .. } => "sign_up",
        }
    }
}

// Passwords never reach the logs.
impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRequest::SignIn { email, .. } => f
                .debug_struct("SignIn")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            AuthRequest::SignUp {
                username, email, ..
            } => f
                .debug_struct("SignUp")
                .field("username", username)
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// A content change the remote side is asked to persist.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentMutation {
    Like {
        post_id: PostId,
        user_id: UserId,
    },
    Unlike {
        post_id: PostId,
        user_id: UserId,
    },
    Comment {
        post_id: PostId,
        comment_id: CommentId,
        user_id: UserId,
        content: String,
    },
    Publish {
        post_id: PostId,
        author_id: UserId,
        content: String,
    },
}

impl ContentMutation {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentMutation::Like { .. } => "like",
            ContentMutation::Unlike { .. } => "unlike",
            ContentMutation::Comment { .. } => "comment",
            ContentMutation::Publish { .. } => "publish",
        }
    }

    pub fn post_id(&self) -> PostId {
        match self {
            ContentMutation::Like { post_id, .. }
            | ContentMutation::Unlike { post_id, .. }
            | ContentMutation::Comment { post_id, .. }
            | ContentMutation::Publish { post_id, .. } => *post_id,
        }
    }
}
