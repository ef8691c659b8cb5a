//! Credit ledger.
//!
//! Balances live on the `users` row; every change is also written to
//! `credit_transactions`. Each mutating call is a single transaction that
//! starts with the write, so concurrent debits serialize on SQLite's write
//! lock and never lose an update.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DatabaseError, Result};
use crate::models::{Balance, CreditTransaction};
use crate::validation::ValidationError;

/// Current balance of a user.
pub async fn balance(pool: &SqlitePool, user_id: &str) -> Result<Balance> {
    let row = sqlx::query_as::<_, (bool, i64)>(
        "SELECT credits_exempt, credits FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("User", user_id))?;

    Ok(Balance::of(row.0, row.1))
}

/// Admission check: exempt, or a strictly positive balance.
pub async fn can_send(pool: &SqlitePool, user_id: &str) -> Result<bool> {
    Ok(balance(pool, user_id).await?.admits())
}

/// Charge `amount` tokens to a user.
///
/// The decrement is unconditional and may take the balance below zero.
/// Exempt users are left untouched and no transaction is recorded.
pub async fn debit(
    pool: &SqlitePool,
    user_id: &str,
    amount: u32,
    description: &str,
    session_id: Option<&str>,
) -> Result<Balance> {
    let amount = i64::from(amount);
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE users
        SET credits = credits - ?
        WHERE id = ? AND credits_exempt = 0
        RETURNING credits
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(credits) = updated else {
        let exempt = sqlx::query_scalar::<_, bool>("SELECT credits_exempt FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", user_id))?;
        tx.rollback().await?;

        tracing::debug!(user_id, exempt, "Debit skipped for exempt user");
        return Ok(Balance::Unlimited);
    };

    record_transaction(&mut tx, user_id, -amount, description, session_id).await?;
    tx.commit().await?;

    tracing::debug!(user_id, amount, credits, "Debited credits");
    Ok(Balance::Limited(credits))
}

/// Administrative grant (positive) or revocation (negative).
///
/// Applies to the stored balance of exempt users as well. Returns the new
/// stored balance.
pub async fn adjust(
    pool: &SqlitePool,
    user_id: &str,
    delta: i64,
    description: &str,
) -> Result<i64> {
    // Rows whose balance would overflow i64 are left unmatched
    let (floor, ceiling) = if delta >= 0 {
        (i64::MIN, i64::MAX - delta)
    } else {
        (i64::MIN - delta, i64::MAX)
    };

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE users
        SET credits = credits + ?
        WHERE id = ? AND credits BETWEEN ? AND ?
        RETURNING credits
        "#,
    )
    .bind(delta)
    .bind(user_id)
    .bind(floor)
    .bind(ceiling)
    .fetch_optional(&mut *tx)
    .await?;

    let credits = match updated {
        Some(credits) => credits,
        None => {
            let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            return Err(if exists {
                ValidationError::OutOfRange("credits".to_string()).into()
            } else {
                DatabaseError::not_found("User", user_id)
            });
        }
    };

    record_transaction(&mut tx, user_id, delta, description, None).await?;
    tx.commit().await?;

    tracing::info!(user_id, delta, credits, "Adjusted credits");
    Ok(credits)
}

/// Most recent transactions of a user, newest first.
pub async fn list_transactions(
    pool: &SqlitePool,
    user_id: &str,
    limit: u32,
) -> Result<Vec<CreditTransaction>> {
    let rows = sqlx::query_as::<_, CreditTransaction>(
        r#"
        SELECT id, user_id, amount, description, session_id, created_at
        FROM credit_transactions
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn record_transaction(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    amount: i64,
    description: &str,
    session_id: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO credit_transactions (id, user_id, amount, description, session_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(amount)
    .bind(description)
    .bind(session_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
