//! Identity collaborator interface: token verification.
//!
//! Kasbook never authenticates users itself; it only verifies tokens issued
//! elsewhere and uses the resulting `outlet_id` to scope every query.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::types::{OutletId, UserId};

/// The authenticated caller: supplies the tenant scope for every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// The user performing the action.
    pub user_id: UserId,
    /// The outlet (tenant) every query is scoped to.
    pub outlet_id: OutletId,
    /// The user's email address.
    pub email: String,
}

/// Verifies an opaque bearer token into an [`AuthContext`].
pub trait TokenVerifier: Send + Sync {
    /// Verifies the token and extracts the caller's identity and scope.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for expired or malformed tokens.
    fn verify(&self, token: &str) -> AppResult<AuthContext>;
}

/// JWT claims carried by tokens the identity service issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// The outlet the token is scoped to.
    pub outlet_id: Uuid,
    /// The user's email address.
    pub email: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user scoped to an outlet.
    #[must_use]
    pub fn new(user_id: UserId, outlet_id: OutletId, email: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id.into_inner(),
            outlet_id: outlet_id.into_inner(),
            email: email.to_string(),
            exp: expires_at.timestamp(),
        }
    }
}

/// JWT-backed token verifier.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtVerifier {
    /// Creates a verifier from the shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> AppResult<AuthContext> {
        let validation = Validation::default();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("token has expired".to_string())
                }
                _ => AppError::Unauthorized(format!("invalid token: {e}")),
            })?;

        Ok(AuthContext {
            user_id: UserId::from_uuid(claims.sub),
            outlet_id: OutletId::from_uuid(claims.outlet_id),
            email: claims.email,
        })
    }
}
