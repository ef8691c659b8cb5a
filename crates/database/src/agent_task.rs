//! Agent task records.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{AgentTask, AgentTaskStatus};

const TASK_COLUMNS: &str = "id, user_id, task_type, description, goal, status, credits_used, \
                            result, created_at, updated_at";

const ALL_STATUSES: [AgentTaskStatus; 5] = [
    AgentTaskStatus::Pending,
    AgentTaskStatus::Planning,
    AgentTaskStatus::Running,
    AgentTaskStatus::Completed,
    AgentTaskStatus::Failed,
];

/// Create a pending task.
pub async fn create_task(
    pool: &SqlitePool,
    user_id: &str,
    task_type: &str,
    description: &str,
    goal: Option<&str>,
) -> Result<AgentTask> {
    let task = sqlx::query_as::<_, AgentTask>(&format!(
        r#"
        INSERT INTO agent_tasks (id, user_id, task_type, description, goal)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(task_type)
    .bind(description)
    .bind(goal)
    .fetch_one(pool)
    .await?;

    tracing::info!(task_id = %task.id, user_id, task_type, "Created agent task");
    Ok(task)
}

/// Fetch a task owned by `user_id`.
pub async fn get_task(pool: &SqlitePool, task_id: &str, user_id: &str) -> Result<AgentTask> {
    let task = fetch_task(pool, task_id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("AgentTask", task_id))?;

    if task.user_id != user_id {
        return Err(DatabaseError::Forbidden {
            entity: "AgentTask",
            id: task_id.to_string(),
        });
    }

    Ok(task)
}

/// A user's tasks, newest first.
pub async fn list_tasks(pool: &SqlitePool, user_id: &str, limit: u32) -> Result<Vec<AgentTask>> {
    let tasks = sqlx::query_as::<_, AgentTask>(&format!(
        r#"
        SELECT {TASK_COLUMNS}
        FROM agent_tasks
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#
    ))
    .bind(user_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

/// Move a task to `next`, optionally storing a result and credit usage.
///
/// The move is checked and applied in one statement. Terminal tasks are
/// never modified.
pub async fn update_task_status(
    pool: &SqlitePool,
    task_id: &str,
    next: AgentTaskStatus,
    result: Option<&Value>,
    credits_used: Option<i64>,
) -> Result<AgentTask> {
    let allowed: Vec<AgentTaskStatus> = ALL_STATUSES
        .into_iter()
        .filter(|from| from.can_transition_to(next))
        .collect();

    if !allowed.is_empty() {
        let placeholders = vec!["?"; allowed.len()].join(", ");
        let sql = format!(
            r#"
            UPDATE agent_tasks
            SET status = ?,
                result = COALESCE(?, result),
                credits_used = COALESCE(?, credits_used),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ? AND status IN ({placeholders})
            RETURNING {TASK_COLUMNS}
            "#
        );

        let mut query = sqlx::query_as::<_, AgentTask>(&sql)
            .bind(next)
            .bind(result.map(Json))
            .bind(credits_used)
            .bind(task_id);
        for status in &allowed {
            query = query.bind(*status);
        }

        if let Some(task) = query.fetch_optional(pool).await? {
            tracing::info!(task_id, status = %next, "Agent task status changed");
            return Ok(task);
        }
    }

    let current = fetch_task(pool, task_id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("AgentTask", task_id))?;

    Err(DatabaseError::InvalidTransition {
        id: task_id.to_string(),
        from: current.status.as_str(),
        to: next.as_str(),
    })
}

async fn fetch_task(pool: &SqlitePool, task_id: &str) -> Result<Option<AgentTask>> {
    let task = sqlx::query_as::<_, AgentTask>(&format!(
        "SELECT {TASK_COLUMNS} FROM agent_tasks WHERE id = ?"
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::test_support::test_db;
    use crate::user;
    use serde_json::json;

    async fn seed_user(pool: &SqlitePool, name: &str) -> String {
        user::create_user(pool, &NewUser::new(name, format!("{name}@example.com"), "h", 100))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;

        let task = create_task(db.pool(), &alice, "document", "Summarize the report", None)
            .await
            .unwrap();
        assert_eq!(task.status, AgentTaskStatus::Pending);
        assert_eq!(task.credits_used, 0);
        assert!(task.result.is_none());

        let fetched = get_task(db.pool(), &task.id, &alice).await.unwrap();
        assert_eq!(fetched, task);

        let listed = list_tasks(db.pool(), &alice, 50).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_task_ownership() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;
        let bob = seed_user(db.pool(), "bob").await;

        let task = create_task(db.pool(), &alice, "search", "Find papers", Some("3 sources"))
            .await
            .unwrap();

        assert!(matches!(
            get_task(db.pool(), &task.id, &bob).await,
            Err(DatabaseError::Forbidden { .. })
        ));
        assert!(matches!(
            get_task(db.pool(), "missing", &alice).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_and_terminal_immutability() {
        let db = test_db().await;
        let alice = seed_user(db.pool(), "alice").await;
        let task = create_task(db.pool(), &alice, "browser", "Visit site", None)
            .await
            .unwrap();

        update_task_status(db.pool(), &task.id, AgentTaskStatus::Planning, None, None)
            .await
            .unwrap();
        update_task_status(db.pool(), &task.id, AgentTaskStatus::Running, None, None)
            .await
            .unwrap();
        let done = update_task_status(
            db.pool(),
            &task.id,
            AgentTaskStatus::Completed,
            Some(&json!({"pages": 3})),
            Some(12),
        )
        .await
        .unwrap();
        assert_eq!(done.status, AgentTaskStatus::Completed);
        assert_eq!(done.credits_used, 12);
        assert_eq!(done.result.map(|r| r.0), Some(json!({"pages": 3})));

        let err = update_task_status(db.pool(), &task.id, AgentTaskStatus::Failed, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidTransition { from: "completed", to: "failed", .. }
        ));

        let unchanged = get_task(db.pool(), &task.id, &alice).await.unwrap();
        assert_eq!(unchanged.status, AgentTaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let db = test_db().await;

        let result =
            update_task_status(db.pool(), "missing", AgentTaskStatus::Running, None, None).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
