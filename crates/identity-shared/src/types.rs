//! Common types

use uuid::Uuid;

/// Account/tenant owner identifier. Authors keep the platform's integer ids.
pub type AuthorId = i64;

/// Per-domain session record identifier.
pub type SessionId = Uuid;

pub fn new_session_id() -> SessionId {
    Uuid::new_v4()
}
