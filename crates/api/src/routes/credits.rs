//! Balance and transaction history.

use axum::extract::State;
use axum::Json;
use database::{ledger, Balance, CreditTransaction};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Number of transactions returned with the balance.
const RECENT_TRANSACTIONS: u32 = 20;

#[derive(Serialize)]
pub struct CreditsResponse {
    pub balance: Balance,
    pub transactions: Vec<CreditTransaction>,
}

pub async fn credits(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<CreditsResponse>> {
    let pool = state.db.pool();

    let balance = ledger::balance(pool, &ctx.user_id).await?;
    let transactions = ledger::list_transactions(pool, &ctx.user_id, RECENT_TRANSACTIONS).await?;

    Ok(Json(CreditsResponse {
        balance,
        transactions,
    }))
}
