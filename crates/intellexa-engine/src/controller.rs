//! Conversation controller: runs the submit/respond turn cycle.
//!
//! One turn may be in flight per session. A turn is tracked by a token in
//! the pending map; cancellation removes the token, and a late-arriving
//! producer result whose token is no longer current is dropped without
//! appending anything.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use intellexa_core::config::ChatConfig;
use intellexa_core::events::DomainEvent;
use intellexa_core::types::{Feedback, Message, MessageId, SessionId, Timestamp};

use crate::error::EngineError;
use crate::notify::NotificationSink;
use crate::producer::ResponseProducer;
use crate::registry::SessionRegistry;
use crate::store::MessageDraft;

/// Reply shown in place of an answer when the producer fails or times out.
const PRODUCER_FAILURE_REPLY: &str =
    "I couldn't reach the documentation backend to answer that. Please try again in a moment.";

/// Result of one completed `submit` call.
#[derive(Clone, Debug)]
pub enum TurnOutcome {
    /// The producer resolved and the assistant reply was appended.
    Answered(Message),
    /// The producer failed or timed out; an error-flagged reply was appended.
    Failed(Message),
    /// The turn was cancelled while awaiting; no reply was appended.
    Cancelled,
}

impl TurnOutcome {
    /// The appended assistant message, if the turn produced one.
    pub fn message(&self) -> Option<&Message> {
        match self {
            TurnOutcome::Answered(m) | TurnOutcome::Failed(m) => Some(m),
            TurnOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TurnOutcome::Cancelled)
    }
}

/// Orchestrates turns across sessions: append user input, invoke the
/// producer, append the outcome, keep the registry metadata fresh.
pub struct ConversationController {
    registry: Arc<SessionRegistry>,
    producer: Arc<dyn ResponseProducer>,
    sink: Arc<dyn NotificationSink>,
    pending: Mutex<HashMap<SessionId, u64>>,
    turn_counter: AtomicU64,
    config: ChatConfig,
}

impl ConversationController {
    pub fn new(
        registry: Arc<SessionRegistry>,
        producer: Arc<dyn ResponseProducer>,
        sink: Arc<dyn NotificationSink>,
        config: ChatConfig,
    ) -> Self {
        Self {
            registry,
            producer,
            sink,
            pending: Mutex::new(HashMap::new()),
            turn_counter: AtomicU64::new(0),
            config,
        }
    }

    /// The registry backing this controller, for read-side consumers.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Create a new conversation session.
    pub fn create_session(&self, title: Option<&str>) -> Result<SessionId, EngineError> {
        self.registry.create(title)
    }

    /// Delete a session and discard any turn still awaiting a response for
    /// it; the in-flight result will be dropped when it arrives.
    pub fn delete_session(&self, session_id: SessionId) -> Result<(), EngineError> {
        self.registry.delete(session_id)?;
        self.pending_lock()?.remove(&session_id);
        Ok(())
    }

    /// Whether a turn is currently awaiting a producer response.
    pub fn is_awaiting(&self, session_id: SessionId) -> bool {
        self.pending_lock()
            .map(|p| p.contains_key(&session_id))
            .unwrap_or(false)
    }

    /// Run one turn: append the user message, invoke the producer, append
    /// the outcome.
    ///
    /// Fails with `TurnInProgress` if the session already has a turn
    /// awaiting a response. The user message is appended before the
    /// producer is invoked, so the history the producer sees always ends
    /// with the new submission.
    pub async fn submit(
        &self,
        session_id: SessionId,
        text: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let token = {
            let mut pending = self.pending_lock()?;
            if pending.contains_key(&session_id) {
                return Err(EngineError::TurnInProgress(session_id));
            }
            let token = self.turn_counter.fetch_add(1, Ordering::Relaxed) + 1;
            pending.insert(session_id, token);
            token
        };

        let user_message = match self
            .registry
            .append_message(session_id, MessageDraft::user(text))
        {
            Ok(m) => m,
            Err(e) => {
                self.discard_turn(session_id, token);
                return Err(e);
            }
        };

        let history = match self.registry.get(session_id) {
            Ok(session) => session.messages().to_vec(),
            Err(e) => {
                self.discard_turn(session_id, token);
                return Err(e);
            }
        };

        self.registry.emit(DomainEvent::TurnStarted {
            session_id,
            user_message_id: user_message.id,
            timestamp: Timestamp::now(),
        });

        let timeout = Duration::from_secs(self.config.producer_timeout_secs);
        let result = match tokio::time::timeout(
            timeout,
            self.producer.produce(&history, &user_message),
        )
        .await
        {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => Err(EngineError::ProducerFailed(e.to_string())),
            Err(_) => Err(EngineError::ProducerTimeout(self.config.producer_timeout_secs)),
        };

        // Only the still-registered turn may append its outcome; a turn
        // cancelled (or whose session was deleted) in the meantime drops
        // the result here.
        if !self.finish_turn(session_id, token)? {
            tracing::debug!(session_id = %session_id, "Dropping result of cancelled turn");
            return Ok(TurnOutcome::Cancelled);
        }

        match result {
            Ok(reply) => {
                let message = self.registry.append_message(
                    session_id,
                    MessageDraft::assistant(reply.answer, reply.citations),
                )?;
                self.registry.emit(DomainEvent::TurnCompleted {
                    session_id,
                    assistant_message_id: message.id,
                    citation_count: message.citations.len(),
                    timestamp: Timestamp::now(),
                });
                Ok(TurnOutcome::Answered(message))
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Turn failed");
                let message = self
                    .registry
                    .append_message(session_id, MessageDraft::error_reply(PRODUCER_FAILURE_REPLY))?;
                self.registry.emit(DomainEvent::TurnFailed {
                    session_id,
                    reason: e.to_string(),
                    timestamp: Timestamp::now(),
                });
                Ok(TurnOutcome::Failed(message))
            }
        }
    }

    /// Cancel the turn currently awaiting a response for this session.
    ///
    /// Cooperative: the producer call is not interrupted, but its result
    /// will be dropped. Fails with `NoActiveTurn` when nothing is pending.
    pub fn cancel(&self, session_id: SessionId) -> Result<(), EngineError> {
        if self.pending_lock()?.remove(&session_id).is_none() {
            return Err(EngineError::NoActiveTurn(session_id));
        }
        self.registry.emit(DomainEvent::TurnCancelled {
            session_id,
            timestamp: Timestamp::now(),
        });
        tracing::debug!(session_id = %session_id, "Turn cancelled");
        Ok(())
    }

    /// Record feedback on an assistant message. Positive feedback also
    /// fires an acknowledgement through the notification sink.
    pub async fn feedback(
        &self,
        session_id: SessionId,
        message_id: MessageId,
        value: Feedback,
    ) -> Result<(), EngineError> {
        self.registry.set_feedback(session_id, message_id, value)?;
        if value == Feedback::Positive {
            self.sink
                .notify(
                    "Thank you for your feedback!",
                    "Your positive feedback helps improve Intellexa AI.",
                )
                .await;
        }
        Ok(())
    }

    // -- Internal --

    fn pending_lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, u64>>, EngineError> {
        self.pending
            .lock()
            .map_err(|e| EngineError::Internal(format!("pending-turn lock poisoned: {}", e)))
    }

    /// Remove the pending entry if it still belongs to this turn; returns
    /// whether the turn was still current.
    fn finish_turn(&self, session_id: SessionId, token: u64) -> Result<bool, EngineError> {
        let mut pending = self.pending_lock()?;
        if pending.get(&session_id) == Some(&token) {
            pending.remove(&session_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Drop a turn registration after a failed start.
    fn discard_turn(&self, session_id: SessionId, token: u64) {
        if let Ok(mut pending) = self.pending_lock() {
            if pending.get(&session_id) == Some(&token) {
                pending.remove(&session_id);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
