//! Error types for the conversation engine.

use intellexa_core::error::AssistantError;
use intellexa_core::types::{MessageId, Role, SessionId};

/// Errors from the conversation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),
    #[error("feedback is only recorded on assistant messages, not {0} messages")]
    FeedbackNotAllowed(Role),
    #[error("a turn is already in progress for session {0}")]
    TurnInProgress(SessionId),
    #[error("no turn in progress for session {0}")]
    NoActiveTurn(SessionId),
    #[error("producer failed: {0}")]
    ProducerFailed(String),
    #[error("producer timed out after {0}s")]
    ProducerTimeout(u64),
    #[error("internal state error: {0}")]
    Internal(String),
}

impl From<EngineError> for AssistantError {
    fn from(err: EngineError) -> Self {
        AssistantError::Engine(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::EmptyMessage;
        assert_eq!(err.to_string(), "message cannot be empty");

        let err = EngineError::MessageTooLong(2000);
        assert_eq!(
            err.to_string(),
            "message exceeds maximum length of 2000 characters"
        );

        let err = EngineError::EmptyTitle;
        assert_eq!(err.to_string(), "title cannot be empty");

        let id = SessionId::new();
        let err = EngineError::SessionNotFound(id);
        assert_eq!(err.to_string(), format!("session not found: {}", id));

        let err = EngineError::MessageNotFound(MessageId(7));
        assert_eq!(err.to_string(), "message not found: 7");

        let err = EngineError::FeedbackNotAllowed(Role::User);
        assert_eq!(
            err.to_string(),
            "feedback is only recorded on assistant messages, not user messages"
        );

        let err = EngineError::ProducerFailed("backend unreachable".to_string());
        assert_eq!(err.to_string(), "producer failed: backend unreachable");

        let err = EngineError::ProducerTimeout(30);
        assert_eq!(err.to_string(), "producer timed out after 30s");
    }

    #[test]
    fn test_turn_errors_carry_session_id() {
        let id = SessionId::new();
        let err = EngineError::TurnInProgress(id);
        assert!(err.to_string().contains(&id.to_string()));

        let err = EngineError::NoActiveTurn(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_engine_error_into_assistant_error() {
        let err: AssistantError = EngineError::EmptyMessage.into();
        assert!(matches!(err, AssistantError::Engine(_)));
        assert!(err.to_string().contains("message cannot be empty"));
    }

    #[test]
    fn test_errors_implement_debug() {
        let err = EngineError::TurnInProgress(SessionId::new());
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("TurnInProgress"));

        let err = EngineError::Internal("lock poisoned".to_string());
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("Internal"));
    }
}
