//! Session repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_shared::{AuthorId, SessionId};

use crate::domain::{NewSession, Session};
use crate::error::DomainError;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Looks up the current session for an (author, domain) pair.
    async fn find_by_author_and_domain(
        &self,
        author_id: AuthorId,
        domain: &str,
    ) -> Result<Option<Session>, DomainError>;

    /// Inserts a session, or refreshes token/expiry if a row for the same
    /// (author, domain) already exists. Atomic: concurrent logins for the
    /// same pair converge on a single row.
    async fn upsert(&self, session: &NewSession) -> Result<Session, DomainError>;

    /// Rotates the stored token and expiry in place.
    async fn update_token(
        &self,
        id: &SessionId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, DomainError>;

    /// Deletes every session for an author and returns the deleted rows in
    /// one statement, so enumeration and deletion leave no gap in between.
    async fn delete_all_by_author(
        &self,
        author_id: AuthorId,
    ) -> Result<Vec<Session>, DomainError>;
}
