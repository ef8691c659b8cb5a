//! Chat session store.
//!
//! Sessions own an append-only message list. `message_count` on the session
//! row always equals the number of stored messages, and the next message's
//! `seq` is the current count.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DatabaseError, Result};
use crate::models::{ChatSession, ChatSessionWithMessages, MessageRole, SessionMessage};

/// Title given to sessions created without one.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Default page size for session listings.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

const SESSION_COLUMNS: &str = "id, user_id, title, model, message_count, created_at, updated_at";

/// Create an empty session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    model: &str,
) -> Result<ChatSession> {
    let session = insert_session(pool, user_id, title, model, 0).await?;

    tracing::info!(session_id = %session.id, user_id, model, "Created chat session");
    Ok(session)
}

/// Create a session whose history starts with one exchange.
///
/// Creation and the first append happen in the same transaction, so a
/// session never exists without its first exchange.
pub async fn create_session_with_exchange(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    model: &str,
    user_message: &str,
    assistant_message: &str,
) -> Result<ChatSession> {
    let mut tx = pool.begin().await?;

    let session = insert_session(&mut *tx, user_id, title, model, 2).await?;
    insert_exchange(&mut tx, &session.id, 0, user_message, assistant_message).await?;

    tx.commit().await?;

    tracing::info!(session_id = %session.id, user_id, model, "Created chat session with first exchange");
    Ok(session)
}

/// Append a user turn and the assistant reply, in that order.
///
/// Returns `NotFound` if the session was deleted in the meantime; nothing is
/// written in that case.
pub async fn append_exchange(
    pool: &SqlitePool,
    session_id: &str,
    user_message: &str,
    assistant_message: &str,
) -> Result<ChatSession> {
    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, ChatSession>(&format!(
        r#"
        UPDATE chat_sessions
        SET message_count = message_count + 2,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(session_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::not_found("ChatSession", session_id))?;

    let start = session.message_count - 2;
    insert_exchange(&mut tx, session_id, start, user_message, assistant_message).await?;

    tx.commit().await?;

    tracing::debug!(session_id, message_count = session.message_count, "Appended exchange");
    Ok(session)
}

/// Fetch a session summary, checking ownership.
///
/// `NotFound` if it does not exist, `Forbidden` if another user owns it.
pub async fn get_owned_session(
    pool: &SqlitePool,
    session_id: &str,
    user_id: &str,
) -> Result<ChatSession> {
    let session = sqlx::query_as::<_, ChatSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = ?"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::not_found("ChatSession", session_id))?;

    if session.user_id != user_id {
        return Err(DatabaseError::Forbidden {
            entity: "ChatSession",
            id: session_id.to_string(),
        });
    }

    Ok(session)
}

/// Fetch a session with its full ordered history.
pub async fn get_session(
    pool: &SqlitePool,
    session_id: &str,
    user_id: &str,
) -> Result<ChatSessionWithMessages> {
    let session = get_owned_session(pool, session_id, user_id).await?;

    let messages = sqlx::query_as::<_, SessionMessage>(
        r#"
        SELECT role, content
        FROM chat_messages
        WHERE session_id = ?
        ORDER BY seq
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(ChatSessionWithMessages { session, messages })
}

/// A user's sessions, most recently updated first.
pub async fn list_sessions(
    pool: &SqlitePool,
    user_id: &str,
    limit: u32,
) -> Result<Vec<ChatSession>> {
    let sessions = sqlx::query_as::<_, ChatSession>(&format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM chat_sessions
        WHERE user_id = ?
        ORDER BY updated_at DESC, rowid DESC
        LIMIT ?
        "#
    ))
    .bind(user_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// Delete a session and its messages.
///
/// Sessions owned by someone else are reported as `NotFound`, the same as
/// missing ones.
pub async fn delete_session(pool: &SqlitePool, session_id: &str, user_id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ? AND user_id = ?")
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("ChatSession", session_id));
    }

    tracing::info!(session_id, user_id, "Deleted chat session");
    Ok(())
}

async fn insert_session<'e, E>(
    executor: E,
    user_id: &str,
    title: &str,
    model: &str,
    message_count: i64,
) -> Result<ChatSession>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let session = sqlx::query_as::<_, ChatSession>(&format!(
        r#"
        INSERT INTO chat_sessions (id, user_id, title, model, message_count)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(title)
    .bind(model)
    .bind(message_count)
    .fetch_one(executor)
    .await?;

    Ok(session)
}

async fn insert_exchange(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: &str,
    start_seq: i64,
    user_message: &str,
    assistant_message: &str,
) -> Result<()> {
    for (offset, role, content) in [
        (0, MessageRole::User, user_message),
        (1, MessageRole::Assistant, assistant_message),
    ] {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (session_id, seq, role, content)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(start_seq + offset)
        .bind(role)
        .bind(content)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::test_support::test_db;
    use crate::user;
    use std::time::Duration;

    const MODEL: &str = "mistralai/mistral-7b-instruct:free";

    async fn seed_user(pool: &SqlitePool, name: &str) -> String {
        user::create_user(pool, &NewUser::new(name, format!("{name}@example.com"), "h", 100))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_append() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;

        let session = create_session(db.pool(), &alice, DEFAULT_TITLE, MODEL)
            .await
            .unwrap();
        assert_eq!(session.message_count, 0);
        assert_eq!(session.title, "New Chat");

        append_exchange(db.pool(), &session.id, "hi", "hello").await.unwrap();
        let updated = append_exchange(db.pool(), &session.id, "how are you?", "fine")
            .await
            .unwrap();
        assert_eq!(updated.message_count, 4);

        let full = get_session(db.pool(), &session.id, &alice).await.unwrap();
        assert_eq!(full.session.message_count, 4);
        assert_eq!(
            full.messages,
            vec![
                SessionMessage::user("hi"),
                SessionMessage::assistant("hello"),
                SessionMessage::user("how are you?"),
                SessionMessage::assistant("fine"),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_with_exchange() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;

        let session =
            create_session_with_exchange(db.pool(), &alice, "Greeting", MODEL, "Hello", "Hi!")
                .await
                .unwrap();
        assert_eq!(session.message_count, 2);

        let full = get_session(db.pool(), &session.id, &alice).await.unwrap();
        assert_eq!(full.messages.len(), 2);
        assert_eq!(full.messages[0].role, MessageRole::User);
        assert_eq!(full.messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_append_to_missing_session() {
        let db = test_db().await;

        let result = append_exchange(db.pool(), "missing", "a", "b").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_ownership() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;
        let bob = seed_user(db.pool(), "bob").await;

        let session = create_session(db.pool(), &alice, DEFAULT_TITLE, MODEL)
            .await
            .unwrap();

        assert!(matches!(
            get_session(db.pool(), &session.id, &bob).await,
            Err(DatabaseError::Forbidden { .. })
        ));
        assert!(matches!(
            get_session(db.pool(), "missing", &alice).await,
            Err(DatabaseError::NotFound { .. })
        ));

        // Not owned reads as not found for deletes
        assert!(matches!(
            delete_session(db.pool(), &session.id, &bob).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(list_sessions(db.pool(), &bob, DEFAULT_LIST_LIMIT)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;
        let session =
            create_session_with_exchange(db.pool(), &alice, DEFAULT_TITLE, MODEL, "q", "a")
                .await
                .unwrap();

        delete_session(db.pool(), &session.id, &alice).await.unwrap();

        assert!(matches!(
            get_session(db.pool(), &session.id, &alice).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            delete_session(db.pool(), &session.id, &alice).await,
            Err(DatabaseError::NotFound { .. })
        ));

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;

        let first = create_session(db.pool(), &alice, "first", MODEL).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = create_session(db.pool(), &alice, "second", MODEL).await.unwrap();

        let ids: Vec<String> = list_sessions(db.pool(), &alice, DEFAULT_LIST_LIMIT)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        tokio::time::sleep(Duration::from_millis(5)).await;
        append_exchange(db.pool(), &first.id, "bump", "ok").await.unwrap();

        let listed = list_sessions(db.pool(), &alice, 1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, first.id);
    }

    #[tokio::test]
    async fn test_reread_is_stable() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;
        let session =
            create_session_with_exchange(db.pool(), &alice, DEFAULT_TITLE, MODEL, "one", "1")
                .await
                .unwrap();
        append_exchange(db.pool(), &session.id, "two", "2").await.unwrap();

        let first = get_session(db.pool(), &session.id, &alice).await.unwrap();
        let second = get_session(db.pool(), &session.id, &alice).await.unwrap();

        assert_eq!(first.messages, second.messages);
        assert_eq!(first.session.message_count, second.session.message_count);
        assert_eq!(first.session.updated_at, second.session.updated_at);
    }
}
