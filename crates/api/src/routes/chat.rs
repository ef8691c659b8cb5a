//! Credit-metered chat completion.

use axum::extract::State;
use axum::Json;
use completion_core::{ChatMessage, GenerationParams, TokenUsage};
use database::Balance;
use orchestrator::SendRequest;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{ApiJson, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Existing session; omitted to start a new one.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Title for a new session.
    #[serde(default)]
    pub title: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

impl ChatRequest {
    fn params(&self) -> GenerationParams {
        let defaults = GenerationParams::default();
        GenerationParams {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    /// Balance after settlement.
    pub credits: Balance,
    pub created_at: String,
}

/// Run one send through the orchestrator.
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let params = body.params();
    let request = SendRequest {
        session_id: body.session_id,
        title: body.title,
        messages: body.messages,
        model: body.model.filter(|m| !m.trim().is_empty()),
        params,
    };

    let outcome = state.orchestrator.send(&ctx, request).await?;
    let completion = outcome.completion;

    Ok(Json(ChatResponse {
        id: completion
            .id
            .unwrap_or_else(|| format!("chatcmpl-{}", uuid::Uuid::new_v4())),
        session_id: outcome.session_id,
        content: completion.content,
        model: completion.model,
        usage: completion.usage,
        credits: outcome.balance,
        created_at: chrono::Utc::now().to_rfc3339(),
    }))
}
