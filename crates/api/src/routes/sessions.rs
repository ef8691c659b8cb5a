//! Chat session routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{chat_session, validation, ChatSession, ChatSessionWithMessages};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiJson, Result};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Create an empty session.
pub async fn create_session(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ApiJson(body): ApiJson<CreateSessionRequest>,
) -> Result<Json<ChatSession>> {
    let title = body
        .title
        .unwrap_or_else(|| chat_session::DEFAULT_TITLE.to_string());
    let model = body
        .model
        .unwrap_or_else(|| state.orchestrator.default_model().to_string());

    validation::validate_title(&title)?;
    validation::validate_model_length(&model)?;

    let session = chat_session::create_session(state.db.pool(), &ctx.user_id, title.trim(), &model).await?;
    Ok(Json(session))
}

/// The caller's sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<ChatSession>>> {
    let sessions = chat_session::list_sessions(
        state.db.pool(),
        &ctx.user_id,
        chat_session::DEFAULT_LIST_LIMIT,
    )
    .await?;
    Ok(Json(sessions))
}

/// One session with its messages.
pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ChatSessionWithMessages>> {
    let session = chat_session::get_session(state.db.pool(), &id, &ctx.user_id).await?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    chat_session::delete_session(state.db.pool(), &id, &ctx.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
