//! Identity gateway service
//!
//! The login/logout flow behind `/api/identity/{action}`: registers or
//! refreshes the per-domain session on login, and on logout clears every
//! session the author holds while producing the redirect chain that walks
//! the browser through each domain's own logout endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use identity_shared::constants::{IDENTITY_LOGOUT_PATH, MAX_LOGOUT_CHAIN_LEGS};
use identity_shared::utils::mask_token;
use identity_shared::AuthorId;
use tracing::{info, warn};
use url::Url;

use crate::domain::{NewSession, Session};
use crate::error::DomainError;
use crate::repositories::SessionRepository;

/// What a login did to the session store.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// No session existed for (author, domain); one was created.
    Created(Session),
    /// A session existed with a different token; token and expiry were
    /// rotated in place.
    Refreshed(Session),
    /// A session existed with the same token; nothing was written.
    Unchanged(Session),
}

impl LoginOutcome {
    pub fn session(&self) -> &Session {
        match self {
            LoginOutcome::Created(s) | LoginOutcome::Refreshed(s) | LoginOutcome::Unchanged(s) => {
                s
            }
        }
    }
}

pub struct GatewayService {
    sessions: Arc<dyn SessionRepository>,
    max_chain_legs: usize,
}

impl GatewayService {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            sessions,
            max_chain_legs: MAX_LOGOUT_CHAIN_LEGS,
        }
    }

    /// Overrides the logout chain cap. Sessions past the cap are still
    /// deleted; only browser-visible legs are bounded.
    pub fn with_chain_cap(mut self, max_chain_legs: usize) -> Self {
        self.max_chain_legs = max_chain_legs;
        self
    }

    /// Registers or refreshes the session for the callback URL's origin.
    ///
    /// `session_token` is the auth cookie value on the current domain;
    /// `expires_at` comes from the identity token's expiry claim.
    pub async fn login(
        &self,
        author_id: AuthorId,
        expires_at: DateTime<Utc>,
        callback_url: &Url,
        session_token: &str,
    ) -> Result<LoginOutcome, DomainError> {
        let domain = callback_url.origin().ascii_serialization();

        match self
            .sessions
            .find_by_author_and_domain(author_id, &domain)
            .await?
        {
            Some(existing) if existing.token == session_token => {
                info!(author_id, %domain, "login: session current, no write");
                Ok(LoginOutcome::Unchanged(existing))
            }
            Some(existing) => {
                let updated = self
                    .sessions
                    .update_token(&existing.id, session_token, expires_at)
                    .await?;
                info!(
                    author_id,
                    %domain,
                    token = %mask_token(session_token),
                    "login: session token rotated"
                );
                Ok(LoginOutcome::Refreshed(updated))
            }
            None => {
                let created = self
                    .sessions
                    .upsert(&NewSession {
                        author_id,
                        domain: domain.clone(),
                        token: session_token.to_string(),
                        expires_at,
                    })
                    .await?;
                info!(author_id, %domain, "login: session created");
                Ok(LoginOutcome::Created(created))
            }
        }
    }

    /// Deletes every session for the author and returns the redirect URL
    /// that chains each deleted domain's logout endpoint via repeated
    /// `next=` parameters, ending back at `callback_url`.
    ///
    /// `carried_next` holds legs an upstream hop already queued; they are
    /// re-attached so the chain keeps advancing.
    pub async fn logout(
        &self,
        author_id: AuthorId,
        callback_url: &Url,
        carried_next: &[String],
    ) -> Result<Url, DomainError> {
        let deleted = self.sessions.delete_all_by_author(author_id).await?;

        if deleted.len() > self.max_chain_legs {
            warn!(
                author_id,
                sessions = deleted.len(),
                cap = self.max_chain_legs,
                "logout: chain truncated, all sessions deleted regardless"
            );
        }

        let mut legs: Vec<String> = deleted
            .iter()
            .take(self.max_chain_legs)
            .filter_map(|session| match logout_leg(&session.domain, callback_url) {
                Ok(leg) => Some(leg.into()),
                Err(e) => {
                    warn!(author_id, domain = %session.domain, error = %e, "logout: skipping unparseable session domain");
                    None
                }
            })
            .collect();
        legs.extend(carried_next.iter().cloned());

        info!(author_id, sessions = deleted.len(), legs = legs.len(), "logout: sessions cleared");

        match legs.split_first() {
            None => Ok(callback_url.clone()),
            Some((first, rest)) => {
                let mut chain = Url::parse(first)
                    .map_err(|e| DomainError::InvalidDomain(format!("{first}: {e}")))?;
                for leg in rest {
                    chain.query_pairs_mut().append_pair("next", leg);
                }
                Ok(chain)
            }
        }
    }
}

/// Builds one chain leg: `{domain}/api/identity/logout?origin=<callback>`.
fn logout_leg(domain: &str, callback_url: &Url) -> Result<Url, DomainError> {
    let mut leg =
        Url::parse(domain).map_err(|e| DomainError::InvalidDomain(format!("{domain}: {e}")))?;
    leg.set_path(IDENTITY_LOGOUT_PATH);
    leg.query_pairs_mut()
        .append_pair("origin", callback_url.as_str());
    Ok(leg)
}
