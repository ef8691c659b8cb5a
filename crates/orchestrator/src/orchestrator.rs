//! Credit-metered send pipeline.

use std::sync::Arc;

use completion_core::{ChatMessage, Completer, Completion, GenerationParams, Role};
use database::{chat_session, ledger, validation, Balance, ChatSession, Database};
use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::error::OrchestratorError;
use crate::view::ConversationView;

/// One chat send as received from the client.
#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    /// Existing session to append to. `None` starts a new session.
    pub session_id: Option<String>,
    /// Title for a new session.
    pub title: Option<String>,
    /// Full client-side history, ending with the new user turn.
    pub messages: Vec<ChatMessage>,
    /// Upstream model id. Falls back to the session's model, then the default.
    pub model: Option<String>,
    pub params: GenerationParams,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub completion: Completion,
    pub session_id: String,
    /// Whether the send created the session.
    pub session_created: bool,
    /// Balance after settlement.
    pub balance: Balance,
}

/// Where the exchange will be stored.
enum SessionPlan {
    Existing(ChatSession),
    New { title: String },
}

/// Runs admission, invocation, persistence and settlement for each send.
///
/// No database connection is held while the upstream call is in flight. If
/// the caller's future is dropped before the call returns, neither
/// persistence nor settlement happens.
#[derive(Clone)]
pub struct Orchestrator {
    db: Database,
    completer: Arc<dyn Completer>,
    default_model: String,
}

impl Orchestrator {
    pub fn new(db: Database, completer: Arc<dyn Completer>, default_model: impl Into<String>) -> Self {
        Self {
            db,
            completer,
            default_model: default_model.into(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Handle one send.
    ///
    /// Steps, in order: validate, admit, resolve session, invoke, persist,
    /// settle. A failure at any step stops the pipeline; nothing after it
    /// runs, so a failed invocation leaves sessions and balance untouched.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        request: SendRequest,
    ) -> Result<SendOutcome, OrchestratorError> {
        let pool = self.db.pool();

        // 1. Validate
        let user_turn = last_user_turn(&request.messages)?.to_string();
        if let Some(model) = &request.model {
            validation::validate_model_length(model).map_err(database::DatabaseError::from)?;
        }
        if let Some(title) = &request.title {
            validation::validate_title(title).map_err(database::DatabaseError::from)?;
        }

        // 2. Admission
        if !ledger::can_send(pool, &ctx.user_id).await? {
            info!(user_id = %ctx.user_id, "Send rejected: insufficient credits");
            return Err(OrchestratorError::InsufficientCredits);
        }

        // 3. Session resolution
        let plan = match &request.session_id {
            Some(id) => SessionPlan::Existing(
                chat_session::get_owned_session(pool, id, &ctx.user_id).await?,
            ),
            None => SessionPlan::New {
                title: request
                    .title
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or(chat_session::DEFAULT_TITLE)
                    .to_string(),
            },
        };

        let model = match (&request.model, &plan) {
            (Some(model), _) => model.clone(),
            (None, SessionPlan::Existing(session)) => session.model.clone(),
            (None, SessionPlan::New { .. }) => self.default_model.clone(),
        };

        // 4. Invocation
        debug!(
            user_id = %ctx.user_id,
            model = %model,
            messages = request.messages.len(),
            completer = self.completer.name(),
            "Invoking completion"
        );
        let completion = self
            .completer
            .complete(&request.messages, &model, &request.params)
            .await
            .map_err(|e| {
                warn!(user_id = %ctx.user_id, model = %model, error = %e, "Completion failed");
                e
            })?;

        // 5. Persistence
        let (session_id, session_created) = match plan {
            SessionPlan::Existing(session) => {
                chat_session::append_exchange(pool, &session.id, &user_turn, &completion.content)
                    .await?;
                (session.id, false)
            }
            SessionPlan::New { title } => {
                let session = chat_session::create_session_with_exchange(
                    pool,
                    &ctx.user_id,
                    &title,
                    &model,
                    &user_turn,
                    &completion.content,
                )
                .await?;
                (session.id, true)
            }
        };

        // 6. Settlement
        let tokens = completion.usage.total_tokens;
        let balance = ledger::debit(
            pool,
            &ctx.user_id,
            tokens,
            &format!("Chat completion using {}", model),
            Some(&session_id),
        )
        .await?;

        info!(
            user_id = %ctx.user_id,
            session_id = %session_id,
            model = %model,
            tokens,
            balance = %balance,
            "Send settled"
        );

        // 7. Response
        Ok(SendOutcome {
            completion,
            session_id,
            session_created,
            balance,
        })
    }

    /// Send one user turn through a local conversation view.
    ///
    /// The turn is staged before the call, committed with the reply on
    /// success and rolled back on any failure.
    pub async fn send_turn(
        &self,
        ctx: &RequestContext,
        view: &mut ConversationView,
        content: &str,
        params: GenerationParams,
    ) -> Result<SendOutcome, OrchestratorError> {
        view.stage(content)?;

        let request = SendRequest {
            session_id: view.session_id().map(str::to_string),
            title: None,
            messages: view.messages().to_vec(),
            model: None,
            params,
        };

        match self.send(ctx, request).await {
            Ok(outcome) => {
                view.commit(&outcome.session_id, outcome.completion.content.clone())?;
                Ok(outcome)
            }
            Err(err) => {
                view.rollback()?;
                Err(err)
            }
        }
    }
}

/// The new user turn: the last message, which must be a non-empty user turn.
fn last_user_turn(messages: &[ChatMessage]) -> Result<&str, OrchestratorError> {
    let last = messages
        .last()
        .ok_or_else(|| OrchestratorError::Validation("messages cannot be empty".to_string()))?;

    if last.role != Role::User {
        return Err(OrchestratorError::Validation(format!(
            "last message must be a user turn, got {}",
            last.role
        )));
    }

    if last.content.trim().is_empty() {
        return Err(OrchestratorError::Validation(
            "last message cannot be empty".to_string(),
        ));
    }

    Ok(&last.content)
}
