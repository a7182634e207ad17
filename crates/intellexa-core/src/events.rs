use serde::{Deserialize, Serialize};

use crate::types::{Feedback, MessageId, Role, SessionId, Timestamp};

/// All domain events emitted by the conversation engine.
///
/// Events are emitted after state changes and consumed by:
/// - The SSE broadcast channel (for real-time UI updates)
/// - Cross-context listeners (notification sinks, audit logging)
///
/// Events carry identifiers and metadata, never full message bodies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DomainEvent {
    // =========================================================================
    // Session lifecycle
    // =========================================================================
    /// A new conversation session was created.
    SessionCreated {
        session_id: SessionId,
        title: String,
        timestamp: Timestamp,
    },

    /// A session and all its messages were deleted.
    SessionDeleted {
        session_id: SessionId,
        message_count: usize,
        timestamp: Timestamp,
    },

    /// A session's star flag was flipped.
    SessionStarToggled {
        session_id: SessionId,
        is_starred: bool,
        timestamp: Timestamp,
    },

    // =========================================================================
    // Messages
    // =========================================================================
    /// A message was appended to a session's log.
    MessageAppended {
        session_id: SessionId,
        message_id: MessageId,
        role: Role,
        timestamp: Timestamp,
    },

    /// Feedback was recorded on an assistant message.
    FeedbackRecorded {
        session_id: SessionId,
        message_id: MessageId,
        feedback: Feedback,
        timestamp: Timestamp,
    },

    // =========================================================================
    // Turns
    // =========================================================================
    /// A user submission started a turn; the producer call is in flight.
    TurnStarted {
        session_id: SessionId,
        user_message_id: MessageId,
        timestamp: Timestamp,
    },

    /// The producer resolved and the assistant reply was appended.
    TurnCompleted {
        session_id: SessionId,
        assistant_message_id: MessageId,
        citation_count: usize,
        timestamp: Timestamp,
    },

    /// The producer failed or timed out; an error reply was appended.
    TurnFailed {
        session_id: SessionId,
        reason: String,
        timestamp: Timestamp,
    },

    /// The pending turn was cancelled before the producer resolved.
    TurnCancelled {
        session_id: SessionId,
        timestamp: Timestamp,
    },
}

impl DomainEvent {
    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            DomainEvent::SessionCreated { timestamp, .. }
            | DomainEvent::SessionDeleted { timestamp, .. }
            | DomainEvent::SessionStarToggled { timestamp, .. }
            | DomainEvent::MessageAppended { timestamp, .. }
            | DomainEvent::FeedbackRecorded { timestamp, .. }
            | DomainEvent::TurnStarted { timestamp, .. }
            | DomainEvent::TurnCompleted { timestamp, .. }
            | DomainEvent::TurnFailed { timestamp, .. }
            | DomainEvent::TurnCancelled { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a stable event name for logging and SSE.
    pub fn event_name(&self) -> &'static str {
        match self {
            DomainEvent::SessionCreated { .. } => "session_created",
            DomainEvent::SessionDeleted { .. } => "session_deleted",
            DomainEvent::SessionStarToggled { .. } => "session_star_toggled",
            DomainEvent::MessageAppended { .. } => "message_appended",
            DomainEvent::FeedbackRecorded { .. } => "feedback_recorded",
            DomainEvent::TurnStarted { .. } => "turn_started",
            DomainEvent::TurnCompleted { .. } => "turn_completed",
            DomainEvent::TurnFailed { .. } => "turn_failed",
            DomainEvent::TurnCancelled { .. } => "turn_cancelled",
        }
    }

    /// Returns the session the event belongs to.
    pub fn session_id(&self) -> SessionId {
        match self {
            DomainEvent::SessionCreated { session_id, .. }
            | DomainEvent::SessionDeleted { session_id, .. }
            | DomainEvent::SessionStarToggled { session_id, .. }
            | DomainEvent::MessageAppended { session_id, .. }
            | DomainEvent::FeedbackRecorded { session_id, .. }
            | DomainEvent::TurnStarted { session_id, .. }
            | DomainEvent::TurnCompleted { session_id, .. }
            | DomainEvent::TurnFailed { session_id, .. }
            | DomainEvent::TurnCancelled { session_id, .. } => *session_id,
        }
    }
}
