//! Database models.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use sqlx::types::Json;
use sqlx::FromRow;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// UUID string.
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// May use the admin routes.
    pub is_admin: bool,
    /// Bypasses admission and settlement.
    pub credits_exempt: bool,
    /// Stored balance. Settlement can drive it below zero.
    pub credits: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last successful login.
    pub last_login: Option<String>,
}

impl User {
    /// The balance as the ledger reports it.
    pub fn balance(&self) -> Balance {
        Balance::of(self.credits_exempt, self.credits)
    }
}

/// Fields needed to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub credits: i64,
    pub is_admin: bool,
    pub credits_exempt: bool,
}

impl NewUser {
    /// A regular, non-exempt account with a starting balance.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        credits: i64,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            credits,
            is_admin: false,
            credits_exempt: false,
        }
    }

    /// Mark the account as an administrator with unlimited credits.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self.credits_exempt = true;
        self
    }
}

/// A user's spendable balance.
///
/// Serializes as the integer balance, or the string `"unlimited"` for
/// exempt accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Limited(i64),
    Unlimited,
}

impl Balance {
    pub fn of(exempt: bool, credits: i64) -> Self {
        if exempt {
            Balance::Unlimited
        } else {
            Balance::Limited(credits)
        }
    }

    /// Whether a send would be admitted.
    pub fn admits(&self) -> bool {
        match self {
            Balance::Unlimited => true,
            Balance::Limited(credits) => *credits > 0,
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Balance::Limited(credits) => write!(f, "{}", credits),
            Balance::Unlimited => f.write_str("unlimited"),
        }
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Balance::Limited(credits) => serializer.serialize_i64(*credits),
            Balance::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

/// A recorded balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CreditTransaction {
    pub id: String,
    pub user_id: String,
    /// Negative for usage, positive for grants.
    pub amount: i64,
    pub description: String,
    pub session_id: Option<String>,
    pub created_at: String,
}

/// Author of a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One turn of a stored conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SessionMessage {
    pub role: MessageRole,
    pub content: String,
}

impl SessionMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat session summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: String,
    /// Owning user id.
    pub user_id: String,
    pub title: String,
    /// Model id selected for the session.
    pub model: String,
    pub message_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A session together with its ordered history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSessionWithMessages {
    #[serde(flatten)]
    pub session: ChatSession,
    pub messages: Vec<SessionMessage>,
}

/// Lifecycle state of an agent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AgentTaskStatus {
    Pending,
    Planning,
    Running,
    Completed,
    Failed,
}

impl AgentTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentTaskStatus::Pending => "pending",
            AgentTaskStatus::Planning => "planning",
            AgentTaskStatus::Running => "running",
            AgentTaskStatus::Completed => "completed",
            AgentTaskStatus::Failed => "failed",
        }
    }

    /// Completed and failed tasks never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentTaskStatus::Completed | AgentTaskStatus::Failed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: AgentTaskStatus) -> bool {
        use AgentTaskStatus::*;
        match (self, next) {
            (Pending, Planning | Running | Failed) => true,
            (Planning, Running | Failed) => true,
            (Running, Completed | Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AgentTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored agent task record. No execution engine acts on these.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AgentTask {
    pub id: String,
    pub user_id: String,
    pub task_type: String,
    pub description: String,
    pub goal: Option<String>,
    pub status: AgentTaskStatus,
    pub credits_used: i64,
    /// Free-form result payload.
    pub result: Option<Json<serde_json::Value>>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_serializes_as_number_or_unlimited() {
        assert_eq!(serde_json::to_string(&Balance::Limited(-3)).unwrap(), "-3");
        assert_eq!(
            serde_json::to_string(&Balance::Unlimited).unwrap(),
            "\"unlimited\""
        );
    }

    #[test]
    fn test_balance_admission() {
        assert!(!Balance::Limited(0).admits());
        assert!(!Balance::Limited(-5).admits());
        assert!(Balance::Limited(1).admits());
        assert!(Balance::Unlimited.admits());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: "u1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            is_admin: false,
            credits_exempt: false,
            credits: 10,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            last_login: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["credits"], 10);
    }

    #[test]
    fn test_task_status_lifecycle() {
        use AgentTaskStatus::*;

        assert!(Pending.can_transition_to(Planning));
        assert!(Planning.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));
        assert!(!Running.can_transition_to(Pending));

        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Planning, Running, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
