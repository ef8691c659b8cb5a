//! Client-side conversation view with staged user turns.
//!
//! A send first stages the user's turn so it can be shown immediately. The
//! turn is then either committed together with the assistant reply, or
//! rolled back if the send failed, leaving the view exactly as it was.

use completion_core::{ChatMessage, Role};
use thiserror::Error;

/// Misuse of the stage / commit / rollback protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("a user turn is already staged")]
    AlreadyStaged,
    #[error("no user turn is staged")]
    NothingStaged,
    #[error("cannot stage an empty message")]
    EmptyMessage,
}

/// Local copy of one conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    session_id: Option<String>,
    messages: Vec<ChatMessage>,
    staged: bool,
}

impl ConversationView {
    /// A view with no history and no session yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A view of an existing stored session.
    pub fn for_session(session_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            messages,
            ..Self::default()
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.staged
    }

    /// Phase one: show the user's turn before the reply arrives.
    pub fn stage(&mut self, content: impl Into<String>) -> Result<(), ViewError> {
        if self.staged {
            return Err(ViewError::AlreadyStaged);
        }

        let content = content.into();
        if content.trim().is_empty() {
            return Err(ViewError::EmptyMessage);
        }

        self.messages.push(ChatMessage::user(content));
        self.staged = true;
        Ok(())
    }

    /// Phase two on success: keep the staged turn and append the reply.
    ///
    /// The first successful send of a new conversation also binds the view
    /// to the session the server created.
    pub fn commit(&mut self, session_id: &str, reply: impl Into<String>) -> Result<(), ViewError> {
        if !self.staged {
            return Err(ViewError::NothingStaged);
        }

        self.messages.push(ChatMessage::assistant(reply));
        self.session_id.get_or_insert_with(|| session_id.to_string());
        self.staged = false;
        Ok(())
    }

    /// Phase two on failure: drop the staged turn.
    pub fn rollback(&mut self) -> Result<(), ViewError> {
        if !self.staged {
            return Err(ViewError::NothingStaged);
        }

        match self.messages.pop() {
            Some(msg) if msg.role == Role::User => {}
            Some(msg) => self.messages.push(msg),
            None => {}
        }
        self.staged = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_then_commit() {
        let mut view = ConversationView::new();

        view.stage("Hello").unwrap();
        assert!(view.is_pending());
        assert_eq!(view.messages().len(), 1);

        view.commit("s1", "Hi!").unwrap();
        assert!(!view.is_pending());
        assert_eq!(view.session_id(), Some("s1"));
        assert_eq!(
            view.messages(),
            &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi!")]
        );
    }

    #[test]
    fn test_rollback_restores_previous_state() {
        let mut view =
            ConversationView::for_session("s1", vec![ChatMessage::user("a"), ChatMessage::assistant("b")]);
        let before = view.messages().to_vec();

        view.stage("c").unwrap();
        view.rollback().unwrap();

        assert_eq!(view.messages(), before.as_slice());
        assert!(!view.is_pending());
    }

    #[test]
    fn test_commit_keeps_existing_session() {
        let mut view = ConversationView::for_session("s1", Vec::new());
        view.stage("x").unwrap();
        view.commit("other", "y").unwrap();
        assert_eq!(view.session_id(), Some("s1"));
    }

    #[test]
    fn test_protocol_misuse() {
        let mut view = ConversationView::new();

        assert_eq!(view.commit("s", "r"), Err(ViewError::NothingStaged));
        assert_eq!(view.rollback(), Err(ViewError::NothingStaged));
        assert_eq!(view.stage("   "), Err(ViewError::EmptyMessage));

        view.stage("one").unwrap();
        assert_eq!(view.stage("two"), Err(ViewError::AlreadyStaged));
    }
}
