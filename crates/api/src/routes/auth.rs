//! Registration, login and current-user routes.

use axum::extract::State;
use axum::Json;
use database::{user, validation, DatabaseError, NewUser, User};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{self as tokens, AuthUser};
use crate::error::{ApiError, ApiJson, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

/// Create an account with the configured starting balance.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<User>> {
    let username = body.username.trim().to_string();
    let email = body.email.trim().to_string();

    validation::validate_username(&username)?;
    validation::validate_email(&email)?;
    validation::validate_password(&body.password)?;

    let password_hash = tokens::hash_password_blocking(body.password).await?;
    let new_user = NewUser::new(username, email, password_hash, state.new_user_credits);
    let created = user::create_user(state.db.pool(), &new_user).await?;

    info!(user_id = %created.id, "User registered");
    Ok(Json(created))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let bad_credentials = || ApiError::Unauthorized("Incorrect username or password".to_string());

    let found = match user::get_user_by_username(state.db.pool(), body.username.trim()).await {
        Ok(found) => found,
        Err(DatabaseError::NotFound { .. }) => return Err(bad_credentials()),
        Err(e) => return Err(e.into()),
    };

    if !tokens::verify_password_blocking(body.password, found.password_hash.clone()).await? {
        info!(user_id = %found.id, "Login failed");
        return Err(bad_credentials());
    }

    let logged_in = user::record_login(state.db.pool(), &found.id).await?;
    let access_token = state.tokens.issue(&logged_in)?;

    info!(user_id = %logged_in.id, "User logged in");
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
        user: logged_in,
    }))
}

/// The authenticated user's account.
pub async fn me(State(state): State<AppState>, AuthUser(ctx): AuthUser) -> Result<Json<User>> {
    let found = user::get_user(state.db.pool(), &ctx.user_id).await?;
    Ok(Json(found))
}
