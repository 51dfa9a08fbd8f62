//! Bearer-token issuance/verification and password hashing.
//!
//! Tokens are HS256 JWTs carrying the user id, username, and role; they expire
//! after a configured window (seven days by default, matching the original
//! deployment). Passwords are hashed with Argon2id in PHC string format.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;

/// Default token lifetime: seven days.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 7 * 24 * 60 * 60;

/// Signing configuration for access tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HS256 signing secret.
    pub jwt_secret: String,
    /// Seconds until an issued token expires.
    pub token_lifetime_secs: u64,
}

impl AuthConfig {
    /// Configuration with the default seven-day lifetime.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

/// Failures from token or password handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Username/password pair did not match.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// Token expired.
    #[error("token expired")]
    TokenExpired,
    /// Token malformed or signature mismatch.
    #[error("invalid token: {0}")]
    TokenInvalid(String),
    /// Hashing or key handling failed.
    #[error("crypto failure: {0}")]
    Crypto(String),
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: user id (UUID string).
    pub sub: String,
    /// Login name, echoed for display.
    pub username: String,
    /// Access role.
    pub role: Role,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl AccessClaims {
    /// The subject parsed back to a user id.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))
    }
}

/// Issue a signed access token for an authenticated user.
pub fn issue_token(
    user_id: Uuid,
    username: &str,
    role: Role,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let lifetime = i64::try_from(config.token_lifetime_secs)
        .map_err(|e| AuthError::Crypto(format!("token lifetime overflow: {e}")))?;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        username: username.to_owned(),
        role,
        iat: now,
        exp: now + lifetime,
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an access token's signature and expiry.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<AccessClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);

    jsonwebtoken::decode::<AccessClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("hash failure: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(false)` on a plain mismatch and `Err` only when the stored
/// hash itself is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid stored hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify failure: {e}"))),
    }
}
