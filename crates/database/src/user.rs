//! User directory operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, credits_exempt, \
                            credits, created_at, last_login";

/// Create a new user with a fresh UUID.
///
/// Returns `AlreadyExists` when the username or email is taken.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    let id = uuid::Uuid::new_v4().to_string();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_admin, credits_exempt, credits)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.is_admin)
    .bind(new_user.credits_exempt)
    .bind(new_user.credits)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                let id = if db_err.message().contains("users.email") {
                    new_user.email.clone()
                } else {
                    new_user.username.clone()
                };
                return DatabaseError::AlreadyExists { entity: "User", id };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    tracing::info!(user_id = %user.id, username = %user.username, "Created user");
    Ok(user)
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("User", id))
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("User", username))
}

/// Stamp a successful login and return the refreshed user.
pub async fn record_login(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET last_login = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("User", id))
}

/// List all users, oldest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Make sure the configured administrator exists.
///
/// Creates the account when the username is free. An existing account keeps
/// its password and balance but is promoted to admin and marked exempt.
pub async fn ensure_admin(pool: &SqlitePool, admin: &NewUser) -> Result<User> {
    let promoted = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET is_admin = 1, credits_exempt = 1
        WHERE username = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&admin.username)
    .fetch_optional(pool)
    .await?;

    if let Some(user) = promoted {
        tracing::info!(user_id = %user.id, "Admin user verified");
        return Ok(user);
    }

    let user = create_user(pool, &admin.clone().admin()).await?;
    tracing::info!(user_id = %user.id, "Admin user created");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;

        let created = create_user(
            db.pool(),
            &NewUser::new("alice", "alice@example.com", "hash", 1000),
        )
        .await
        .unwrap();
        assert_eq!(created.credits, 1000);
        assert!(!created.is_admin);
        assert!(!created.credits_exempt);
        assert!(created.last_login.is_none());

        let fetched = get_user(db.pool(), &created.id).await.unwrap();
        assert_eq!(fetched, created);

        let by_name = get_user_by_username(db.pool(), "alice").await.unwrap();
        assert_eq!(by_name.id, created.id);

        let logged_in = record_login(db.pool(), &created.id).await.unwrap();
        assert!(logged_in.last_login.is_some());

        assert_eq!(list_users(db.pool()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let db = test_db().await;
        create_user(db.pool(), &NewUser::new("alice", "a@example.com", "h", 0))
            .await
            .unwrap();

        let err = create_user(db.pool(), &NewUser::new("alice", "b@example.com", "h", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { ref id, .. } if id == "alice"));

        let err = create_user(db.pool(), &NewUser::new("bob", "a@example.com", "h", 0))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DatabaseError::AlreadyExists { ref id, .. } if id == "a@example.com")
        );
    }

    #[tokio::test]
    async fn test_missing_user() {
        let db = test_db().await;

        let result = get_user(db.pool(), "nope").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let result = record_login(db.pool(), "nope").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_then_promotes() {
        let db = test_db().await;
        let admin = NewUser::new("root", "root@example.com", "h", 0);

        let created = ensure_admin(db.pool(), &admin).await.unwrap();
        assert!(created.is_admin);
        assert!(created.credits_exempt);

        // Second run finds the same account
        let again = ensure_admin(db.pool(), &admin).await.unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(list_users(db.pool()).await.unwrap().len(), 1);

        // Existing regular accounts get promoted
        let plain = create_user(db.pool(), &NewUser::new("ops", "ops@example.com", "h", 5))
            .await
            .unwrap();
        let promoted = ensure_admin(db.pool(), &NewUser::new("ops", "x@example.com", "h2", 0))
            .await
            .unwrap();
        assert_eq!(promoted.id, plain.id);
        assert!(promoted.is_admin && promoted.credits_exempt);
        assert_eq!(promoted.credits, 5);
        assert_eq!(promoted.password_hash, "h");
    }
}
