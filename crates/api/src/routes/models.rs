//! Upstream model listing.

use axum::extract::State;
use axum::Json;
use completion_core::ModelInfo;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
}

/// List models from the cached catalog.
pub async fn list_models(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<ModelList>> {
    let models = state.catalog.list_models().await?;
    Ok(Json(ModelList { models }))
}
