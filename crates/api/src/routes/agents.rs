//! Agent task records. Tasks are stored only; nothing executes them.

use axum::extract::{Path, State};
use axum::Json;
use database::{agent_task, AgentTask};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, Result};
use crate::state::AppState;

const LIST_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(alias = "agent_type")]
    pub task_type: String,
    #[serde(alias = "task_description")]
    pub description: String,
    #[serde(default)]
    pub goal: Option<String>,
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ApiJson(body): ApiJson<CreateTaskRequest>,
) -> Result<Json<AgentTask>> {
    let task_type = body.task_type.trim();
    let description = body.description.trim();

    if task_type.is_empty() {
        return Err(ApiError::BadRequest("task_type cannot be empty".to_string()));
    }
    if description.is_empty() {
        return Err(ApiError::BadRequest("description cannot be empty".to_string()));
    }

    let task = agent_task::create_task(
        state.db.pool(),
        &ctx.user_id,
        task_type,
        description,
        body.goal.as_deref(),
    )
    .await?;
    Ok(Json(task))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<AgentTask>>> {
    let tasks = agent_task::list_tasks(state.db.pool(), &ctx.user_id, LIST_LIMIT).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AgentTask>> {
    let task = agent_task::get_task(state.db.pool(), &id, &ctx.user_id).await?;
    Ok(Json(task))
}
