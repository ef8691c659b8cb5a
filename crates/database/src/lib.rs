//! SQLite persistence layer.
//!
//! This crate provides async database operations for user accounts, the
//! credit ledger, chat sessions and agent task records using SQLx with
//! SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{chat_session, ledger, user, Database, NewUser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:data/chat.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a user with a starting balance
//!     let alice = user::create_user(
//!         db.pool(),
//!         &NewUser::new("alice", "alice@example.com", "$argon2id$...", 1000),
//!     )
//!     .await?;
//!
//!     // Record an exchange and settle its usage
//!     let session = chat_session::create_session_with_exchange(
//!         db.pool(), &alice.id, "New Chat", "mistralai/mistral-7b-instruct:free",
//!         "Hello", "Hi there!",
//!     )
//!     .await?;
//!     ledger::debit(db.pool(), &alice.id, 37, "Chat completion", Some(&session.id)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod agent_task;
pub mod chat_session;
pub mod error;
pub mod ledger;
pub mod models;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    AgentTask, AgentTaskStatus, Balance, ChatSession, ChatSessionWithMessages,
    CreditTransaction, MessageRole, NewUser, SessionMessage, User,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/chat.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// File databases use WAL so readers never wait on the writer. Every
    /// connection to `sqlite::memory:` is a separate database, so in-memory
    /// pools should use a size of 1.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        if !url.contains(":memory:") {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;

    /// Fresh migrated in-memory database.
    pub async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_db;
    use super::*;

    #[tokio::test]
    async fn test_account_session_and_ledger_flow() {
        let db = test_db().await;

        let alice = user::create_user(
            db.pool(),
            &NewUser::new("alice", "alice@example.com", "hash", 1000),
        )
        .await
        .unwrap();

        let session = chat_session::create_session_with_exchange(
            db.pool(),
            &alice.id,
            chat_session::DEFAULT_TITLE,
            "mistralai/mistral-7b-instruct:free",
            "Hello",
            "Hi there!",
        )
        .await
        .unwrap();
        let balance = ledger::debit(db.pool(), &alice.id, 37, "Chat completion", Some(&session.id))
            .await
            .unwrap();

        assert_eq!(balance, Balance::Limited(963));
        let full = chat_session::get_session(db.pool(), &session.id, &alice.id)
            .await
            .unwrap();
        assert_eq!(full.session.message_count, 2);
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let db = test_db().await;
        let bob = user::create_user(db.pool(), &NewUser::new("bob", "bob@example.com", "h", 5))
            .await
            .unwrap();
        chat_session::create_session(db.pool(), &bob.id, "t", "m")
            .await
            .unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&bob.id)
            .execute(db.pool())
            .await
            .unwrap();

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_sessions")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sessions, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_and_debits_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("chat.db").display());
        let db = Database::connect_with_pool_size(&url, 8).await.unwrap();
        db.migrate().await.unwrap();

        let alice = user::create_user(
            db.pool(),
            &NewUser::new("alice", "alice@example.com", "hash", 1000),
        )
        .await
        .unwrap();
        let session = chat_session::create_session(db.pool(), &alice.id, "t", "m")
            .await
            .unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let pool = db.pool().clone();
                let user_id = alice.id.clone();
                let session_id = session.id.clone();
                tokio::spawn(async move {
                    chat_session::append_exchange(
                        &pool,
                        &session_id,
                        &format!("q{i}"),
                        &format!("a{i}"),
                    )
                    .await?;
                    ledger::debit(&pool, &user_id, 10, "usage", Some(&session_id)).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let full = chat_session::get_session(db.pool(), &session.id, &alice.id)
            .await
            .unwrap();
        assert_eq!(full.session.message_count, 80);
        assert_eq!(full.messages.len(), 80);

        // Each exchange stays adjacent: user turn then its own reply
        for pair in full.messages.chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
            assert_eq!(pair[0].content[1..], pair[1].content[1..]);
        }

        let seqs: Vec<i64> = sqlx::query_scalar(
            "SELECT seq FROM chat_messages WHERE session_id = ? ORDER BY seq",
        )
        .bind(&session.id)
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(seqs, (0..80).collect::<Vec<i64>>());

        assert_eq!(
            ledger::balance(db.pool(), &alice.id).await.unwrap(),
            Balance::Limited(600)
        );
        assert_eq!(
            ledger::list_transactions(db.pool(), &alice.id, 100)
                .await
                .unwrap()
                .len(),
            40
        );

        db.close().await;
    }
}
