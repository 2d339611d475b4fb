//! Identity token (JWT) handling

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use identity_shared::AuthorId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Malformed subject claim: {0}")]
    MalformedSubject(String),
}

/// Claims carried by the upstream identity token. `sub` is the author id as
/// a decimal string, `exp` the absolute expiry in unix seconds.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl IdentityClaims {
    pub fn author_id(&self) -> Result<AuthorId, TokenError> {
        self.sub
            .parse::<AuthorId>()
            .map_err(|e| TokenError::MalformedSubject(e.to_string()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

pub struct IdentityTokenService {
    secret: String,
}

impl IdentityTokenService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issues an identity token for an author, expiring after `ttl_seconds`.
    pub fn issue(&self, author_id: AuthorId, ttl_seconds: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: author_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::CreationError(e.to_string()))
    }

    /// Validates signature and expiry, returning the claims.
    pub fn validate(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        decode::<IdentityClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| TokenError::ValidationError(e.to_string()))
    }
}
