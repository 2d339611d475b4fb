//! PostgreSQL session repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use identity_core::domain::{NewSession, Session};
use identity_core::error::DomainError;
use identity_core::repositories::SessionRepository;
use identity_shared::{new_session_id, AuthorId, SessionId};

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct SessionRow {
    pub id: Uuid,
    pub author_id: i64,
    pub domain: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            author_id: row.author_id,
            domain: row.domain,
            token: row.token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_author_and_domain(
        &self,
        author_id: AuthorId,
        domain: &str,
    ) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, author_id, domain, token, expires_at, created_at
            FROM sessions
            WHERE author_id = $1 AND domain = $2
            "#,
        )
        .bind(author_id)
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding session by author and domain", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn upsert(&self, session: &NewSession) -> Result<Session, DomainError> {
        // ON CONFLICT on the unique (author_id, domain) index: concurrent
        // logins for the same pair converge on a single row.
        let row: SessionRow = sqlx::query_as(
            r#"
            INSERT INTO sessions (id, author_id, domain, token, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (author_id, domain)
            DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
            RETURNING id, author_id, domain, token, expires_at, created_at
            "#,
        )
        .bind(new_session_id())
        .bind(session.author_id)
        .bind(&session.domain)
        .bind(&session.token)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("upserting session", e))?;

        Ok(row.into())
    }

    async fn update_token(
        &self,
        id: &SessionId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            UPDATE sessions
            SET token = $2, expires_at = $3
            WHERE id = $1
            RETURNING id, author_id, domain, token, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("rotating session token", e))?;

        row.map(Into::into)
            .ok_or(DomainError::SessionNotFound(*id))
    }

    async fn delete_all_by_author(
        &self,
        author_id: AuthorId,
    ) -> Result<Vec<Session>, DomainError> {
        // Delete and enumerate in one statement so a racing login cannot
        // slip a row in between a read and the delete.
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            DELETE FROM sessions
            WHERE author_id = $1
            RETURNING id, author_id, domain, token, expires_at, created_at
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("deleting sessions by author", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
