//! Append-only message log for a single conversation.
//!
//! Each session exclusively owns one `MessageStore`; messages never outlive
//! their session. The only mutation after append is feedback on assistant
//! messages.

use intellexa_core::types::{Citation, Feedback, Message, MessageId, Role, Timestamp};

use crate::error::EngineError;

// =============================================================================
// MessageDraft
// =============================================================================

/// Input to `MessageStore::append`. The store assigns the id and timestamp.
#[derive(Clone, Debug)]
pub struct MessageDraft {
    pub role: Role,
    pub content: String,
    pub citations: Vec<Citation>,
    pub feedback: Option<Feedback>,
    pub is_error: bool,
}

impl MessageDraft {
    /// A user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
            feedback: None,
            is_error: false,
        }
    }

    /// An assistant reply with its supporting citations.
    pub fn assistant(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations,
            feedback: None,
            is_error: false,
        }
    }

    /// An assistant-authored stand-in for a failed producer call.
    pub fn error_reply(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations: Vec::new(),
            feedback: None,
            is_error: true,
        }
    }

    /// A system notice.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            citations: Vec::new(),
            feedback: None,
            is_error: false,
        }
    }
}

// =============================================================================
// MessageStore
// =============================================================================

/// Ordered, append-only log of messages for one conversation.
#[derive(Clone, Debug)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
    max_message_length: usize,
}

impl MessageStore {
    /// Create an empty store. `max_message_length` bounds user-authored
    /// content only; producer output is not truncated here.
    pub fn new(max_message_length: usize) -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            max_message_length,
        }
    }

    /// Append a message, assigning the next sequence id and the current time.
    ///
    /// Fails with `EmptyMessage` for empty or whitespace-only content, with
    /// `MessageTooLong` for over-long user messages, and with
    /// `FeedbackNotAllowed` when a draft carries feedback on a
    /// non-assistant role.
    pub fn append(&mut self, draft: MessageDraft) -> Result<Message, EngineError> {
        if draft.content.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        if draft.role == Role::User && draft.content.chars().count() > self.max_message_length {
            return Err(EngineError::MessageTooLong(self.max_message_length));
        }
        if draft.feedback.is_some() && draft.role != Role::Assistant {
            return Err(EngineError::FeedbackNotAllowed(draft.role));
        }

        let message = Message {
            id: MessageId(self.next_id),
            role: draft.role,
            content: draft.content,
            created_at: Timestamp::now(),
            citations: draft.citations,
            feedback: draft.feedback,
            is_error: draft.is_error,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Record feedback on an assistant message.
    ///
    /// Re-submitting overwrites the previous value (the user may switch
    /// thumbs-up to thumbs-down).
    pub fn set_feedback(
        &mut self,
        id: MessageId,
        feedback: Feedback,
    ) -> Result<(), EngineError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(EngineError::MessageNotFound(id))?;
        if message.role != Role::Assistant {
            return Err(EngineError::FeedbackNotAllowed(message.role));
        }
        message.feedback = Some(feedback);
        Ok(())
    }

    /// All messages in creation order. Re-callable with no side effects.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message, if any.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use intellexa_core::types::{Confidence, OriginSystem};

    fn make_store() -> MessageStore {
        MessageStore::new(2000)
    }

    fn make_citation() -> Citation {
        Citation {
            title: "Deploy Guide".to_string(),
            source_url: "https://notion.example.com/deploy-guide".to_string(),
            snippet: "Use the release pipeline for all deploys".to_string(),
            confidence: Confidence::new(0.9),
            origin: OriginSystem::Notion,
        }
    }

    // ---- Append ----

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut store = make_store();
        let first = store.append(MessageDraft::user("first")).unwrap();
        let second = store.append(MessageDraft::user("second")).unwrap();
        assert_eq!(first.id, MessageId(1));
        assert_eq!(second.id, MessageId(2));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = make_store();
        for i in 0..50 {
            store.append(MessageDraft::user(format!("message {}", i))).unwrap();
        }
        let contents: Vec<_> = store.messages().iter().map(|m| m.content.clone()).collect();
        let expected: Vec<_> = (0..50).map(|i| format!("message {}", i)).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_append_empty_content_fails() {
        let mut store = make_store();
        let err = store.append(MessageDraft::user("")).unwrap_err();
        assert!(matches!(err, EngineError::EmptyMessage));
    }

    #[test]
    fn test_append_whitespace_only_fails() {
        let mut store = make_store();
        let err = store.append(MessageDraft::user("   \t\n")).unwrap_err();
        assert!(matches!(err, EngineError::EmptyMessage));
    }

    #[test]
    fn test_append_user_message_too_long_fails() {
        let mut store = MessageStore::new(10);
        let err = store.append(MessageDraft::user("a".repeat(11))).unwrap_err();
        assert!(matches!(err, EngineError::MessageTooLong(10)));
    }

    #[test]
    fn test_append_user_message_at_limit_ok() {
        let mut store = MessageStore::new(10);
        assert!(store.append(MessageDraft::user("a".repeat(10))).is_ok());
    }

    #[test]
    fn test_length_limit_counts_chars_not_bytes() {
        let mut store = MessageStore::new(4);
        // Four multi-byte characters are within a 4-char limit.
        assert!(store.append(MessageDraft::user("\u{00e9}\u{00e9}\u{00e9}\u{00e9}")).is_ok());
    }

    #[test]
    fn test_assistant_reply_not_length_limited() {
        let mut store = MessageStore::new(10);
        let long = "a".repeat(100);
        assert!(store.append(MessageDraft::assistant(long, vec![])).is_ok());
    }

    #[test]
    fn test_append_draft_feedback_on_user_fails() {
        let mut store = make_store();
        let mut draft = MessageDraft::user("hello");
        draft.feedback = Some(Feedback::Positive);
        let err = store.append(draft).unwrap_err();
        assert!(matches!(err, EngineError::FeedbackNotAllowed(Role::User)));
    }

    #[test]
    fn test_append_draft_feedback_on_system_fails() {
        let mut store = make_store();
        let mut draft = MessageDraft::system("notice");
        draft.feedback = Some(Feedback::Negative);
        let err = store.append(draft).unwrap_err();
        assert!(matches!(err, EngineError::FeedbackNotAllowed(Role::System)));
    }

    #[test]
    fn test_append_keeps_citation_order() {
        let mut store = make_store();
        let mut second = make_citation();
        second.title = "Second Source".to_string();
        let msg = store
            .append(MessageDraft::assistant(
                "answer",
                vec![make_citation(), second],
            ))
            .unwrap();
        assert_eq!(msg.citations.len(), 2);
        assert_eq!(msg.citations[0].title, "Deploy Guide");
        assert_eq!(msg.citations[1].title, "Second Source");
    }

    #[test]
    fn test_error_reply_is_flagged() {
        let mut store = make_store();
        let msg = store
            .append(MessageDraft::error_reply("something went wrong"))
            .unwrap();
        assert!(msg.is_error);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.citations.is_empty());
    }

    // ---- Feedback ----

    #[test]
    fn test_set_feedback_on_assistant() {
        let mut store = make_store();
        let msg = store.append(MessageDraft::assistant("answer", vec![])).unwrap();
        store.set_feedback(msg.id, Feedback::Positive).unwrap();
        assert_eq!(
            store.messages()[0].feedback,
            Some(Feedback::Positive)
        );
    }

    #[test]
    fn test_set_feedback_overwrites() {
        let mut store = make_store();
        let msg = store.append(MessageDraft::assistant("answer", vec![])).unwrap();
        store.set_feedback(msg.id, Feedback::Positive).unwrap();
        store.set_feedback(msg.id, Feedback::Negative).unwrap();
        assert_eq!(store.messages()[0].feedback, Some(Feedback::Negative));
    }

    #[test]
    fn test_set_feedback_on_user_fails() {
        let mut store = make_store();
        let msg = store.append(MessageDraft::user("question")).unwrap();
        let err = store.set_feedback(msg.id, Feedback::Positive).unwrap_err();
        assert!(matches!(err, EngineError::FeedbackNotAllowed(Role::User)));
        assert!(store.messages()[0].feedback.is_none());
    }

    #[test]
    fn test_set_feedback_unknown_id_fails() {
        let mut store = make_store();
        store.append(MessageDraft::user("question")).unwrap();
        let err = store.set_feedback(MessageId(99), Feedback::Positive).unwrap_err();
        assert!(matches!(err, EngineError::MessageNotFound(MessageId(99))));
    }

    // ---- Listing ----

    #[test]
    fn test_messages_is_restartable() {
        let mut store = make_store();
        store.append(MessageDraft::user("one")).unwrap();
        store.append(MessageDraft::assistant("two", vec![])).unwrap();
        let first: Vec<_> = store.messages().to_vec();
        let second: Vec<_> = store.messages().to_vec();
        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_latest_tracks_last_append() {
        let mut store = make_store();
        assert!(store.latest().is_none());
        store.append(MessageDraft::user("one")).unwrap();
        store.append(MessageDraft::user("two")).unwrap();
        assert_eq!(store.latest().unwrap().content, "two");
    }

    #[test]
    fn test_empty_store() {
        let store = make_store();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_failed_append_leaves_log_untouched() {
        let mut store = make_store();
        store.append(MessageDraft::user("valid")).unwrap();
        let _ = store.append(MessageDraft::user("  "));
        assert_eq!(store.len(), 1);
        // Sequence ids stay contiguous across a failed append.
        let next = store.append(MessageDraft::user("also valid")).unwrap();
        assert_eq!(next.id, MessageId(2));
    }
}
