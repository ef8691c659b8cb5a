//! Bearer tokens and password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use database::User;
use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::prelude::*;
use orchestrator::RequestContext;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Custom claims carried by every token. The standard `exp` and `iat`
/// claims are added by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenIssuer {
    key: Hs256Key,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            key: Hs256Key::new(secret.as_bytes()),
            lifetime: chrono::Duration::hours(lifetime_hours),
        }
    }

    /// Sign a token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let custom = TokenClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            admin: user.is_admin,
        };
        let claims =
            Claims::new(custom).set_duration_and_issuance(&TimeOptions::default(), self.lifetime);

        Hs256
            .token(&Header::empty(), &claims, &self.key)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
    }

    /// Check signature and expiry, returning the custom claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, ApiError> {
        let invalid = |detail: String| {
            tracing::debug!(%detail, "Rejected bearer token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        };

        let untrusted = UntrustedToken::new(token).map_err(|e| invalid(e.to_string()))?;
        let token: Token<TokenClaims> = Hs256
            .validator(&self.key)
            .validate(&untrusted)
            .map_err(|e| invalid(e.to_string()))?;

        token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| invalid(e.to_string()))?;

        Ok(token.claims().custom.clone())
    }
}

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Run the CPU-heavy hashing off the async worker threads.
pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {}", e)))
}

/// Caller identity from a valid `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.tokens.verify(token.trim())?;
        Ok(AuthUser(RequestContext::new(
            claims.sub,
            claims.username,
            claims.admin,
        )))
    }
}

/// An authenticated caller with the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(ctx) = AuthUser::from_request_parts(parts, state).await?;

        if !ctx.is_admin {
            tracing::warn!(user_id = %ctx.user_id, "Admin route refused");
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminUser(ctx))
    }
}
