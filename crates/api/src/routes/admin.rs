//! Administrator routes.

use axum::extract::{Path, State};
use axum::Json;
use database::{ledger, user, User};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AdminUser;
use crate::error::{ApiQuery, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreditsQuery {
    /// Signed amount to add to the user's balance.
    pub credits: i64,
}

#[derive(Serialize)]
pub struct CreditsUpdated {
    pub message: String,
    pub user_id: String,
    pub credits: i64,
}

/// Every account.
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<User>>> {
    let users = user::list_users(state.db.pool()).await?;
    Ok(Json(users))
}

/// Grant (or, with a negative amount, revoke) credits.
pub async fn adjust_credits(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    ApiQuery(query): ApiQuery<CreditsQuery>,
) -> Result<Json<CreditsUpdated>> {
    let description = format!("Credits updated by admin {}", admin.username);
    let credits = ledger::adjust(state.db.pool(), &user_id, query.credits, &description).await?;

    info!(admin_id = %admin.user_id, user_id = %user_id, delta = query.credits, "Admin adjusted credits");
    Ok(Json(CreditsUpdated {
        message: format!("Credits updated for user {}", user_id),
        user_id,
        credits,
    }))
}
