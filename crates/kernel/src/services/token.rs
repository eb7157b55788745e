//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs carrying the user's identity and organization
//! membership. Permissions are never embedded; they are resolved per request.

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::Account;

/// JWT issuer claim value.
const ISSUER: &str = "beheer";

/// Session token lifetime in seconds (24 hours).
pub const SESSION_TOKEN_LIFETIME: i64 = 24 * 60 * 60;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer.
    pub iss: String,
    /// Subject (user ID).
    pub sub: String,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    /// Organization membership role (`OWNER`, `ADMIN`, `USER`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// The secret must be at least 32 bytes; [`crate::config::Config`] enforces it.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for an authenticated account.
    pub fn issue(&self, account: &Account) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let membership = account.membership.as_ref();

        let claims = SessionClaims {
            iss: ISSUER.to_string(),
            sub: account.user.id.to_string(),
            user_id: account.user.id,
            organization_id: membership.map(|m| m.organization_id),
            role: membership.map(|m| m.role.as_str().to_string()),
            iat: now,
            exp: now + SESSION_TOKEN_LIFETIME,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to encode session token")
    }

    /// Verify signature, issuer, and expiry. Any failure is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_aud = false;

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AppError::Unauthorized
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish()
    }
}
