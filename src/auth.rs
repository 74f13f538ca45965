//! Authentication and authorization guard.
//!
//! Access tokens are short-lived JWTs carrying the user id and role. Role is
//! a closed enumeration: a token whose role string does not parse is rejected
//! with 401, it never falls through to either dashboard. Passwords are stored
//! as salted argon2 hashes; plaintext is neither persisted nor logged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::FromRef,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::entities::{user, Role};
use crate::errors::ServiceError;
use crate::AppState;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,
    /// Display name
    pub name: String,
    /// Role string; parsed against the closed [`Role`] set on every request
    pub role: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Per-request context for the authenticated caller.
///
/// Handlers receive this instead of reading ambient session state; every
/// operation that needs the caller's identity or role takes it explicitly.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}

/// The single role gate. Handlers call this rather than comparing role
/// strings inline.
pub fn require_admin(user: &CurrentUser) -> Result<(), ServiceError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "administrator role required".to_string(),
        ))
    }
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct AuthService {
    secret: String,
    token_lifetime: Duration,
}

impl AuthService {
    pub fn new(secret: String, token_lifetime: Duration) -> Self {
        Self {
            secret,
            token_lifetime,
        }
    }

    pub fn issue_token(&self, user: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            iat: now,
            exp: now + self.token_lifetime.as_secs() as i64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("token signing failed: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<CurrentUser, ServiceError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ServiceError::Auth("invalid or expired token".to_string()))?;

        // Fail closed on anything outside the closed role set.
        let role = Role::from_str(&data.claims.role)
            .map_err(|_| ServiceError::Auth("unrecognized role".to_string()))?;

        Ok(CurrentUser {
            id: data.claims.sub,
            name: data.claims.name,
            role,
        })
    }
}

/// Hash a password with a per-password random salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

/// Constant-time verification against a stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ServiceError::Internal(format!("malformed password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::Auth("missing authorization header".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Auth("expected bearer token".to_string()))?
            .trim();

        state.services.auth.verify_token(token)
    }
}
