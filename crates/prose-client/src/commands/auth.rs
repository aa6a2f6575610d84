use prose_shared::Identity;
use prose_store::ContentStore;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;
use crate::state::AppState;

pub async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<Session> {
    let session = state.session.sign_in(email, password).await?;
    Ok(register_session(state, session))
}

pub async fn sign_up(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Session> {
    let session = state.session.sign_up(username, email, password).await?;
    Ok(register_session(state, session))
}

pub fn sign_out(state: &AppState) -> Session {
    state.session.sign_out()
}

/// Register the signed-in identity and hand the session the directory's
/// copy, whose counters are the ones local mutations keep current.
fn register_session(state: &AppState, session: Session) -> Session {
    let Some(identity) = session.identity().cloned() else {
        return session;
    };
    let stored = register_identity(&mut state.content(), &identity);
    if stored == identity {
        return session;
    }
    debug!(user = %stored.id, "Refreshing session identity from the directory");
    let id = stored.id;
    if state.session.update_identity(id, |i| *i = stored) {
        state.session.current_session()
    } else {
        session
    }
}

/// Make sure `identity` is in the user directory so its posts and
/// comments can be attributed. Known identities are left as stored.
/// Returns the directory's copy.
pub(crate) fn register_identity(store: &mut ContentStore, identity: &Identity) -> Identity {
    match store.get_user(identity.id) {
        Ok(stored) => stored,
        Err(_) => {
            debug!(user = %identity.id, username = %identity.username, "Registering new identity");
            store.upsert_user(identity.clone());
            identity.clone()
        }
    }
}
