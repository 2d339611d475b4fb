//! Per-domain session entity
//!
//! One row per (author, domain) pair: the record that lets an author's
//! browser be recognized as authenticated on that domain, distinct from the
//! identity token itself.

use chrono::{DateTime, Utc};
use identity_shared::{AuthorId, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub author_id: AuthorId,
    /// Origin (scheme + host [+ port]) this session is valid for.
    pub domain: String,
    /// Opaque bearer string issued by the auth subsystem (the auth cookie
    /// value on the session's domain).
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Stale sessions are treated as absent by callers; the gateway itself
    /// gates on the identity token's own expiry and does not sweep rows.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Input for creating (or racing into) a session row.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub author_id: AuthorId,
    pub domain: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
