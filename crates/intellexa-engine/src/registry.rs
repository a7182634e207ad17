//! Session registry: owns every conversation and its message log.
//!
//! All registry-mutating operations are serialized by a single mutex so
//! concurrent calls on different sessions never corrupt the collection and
//! racing operations on the same session resolve deterministically (a
//! delete beats a concurrent append; the append then fails with
//! `SessionNotFound`).

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;

use intellexa_core::config::ChatConfig;
use intellexa_core::events::DomainEvent;
use intellexa_core::types::{
    Feedback, Message, MessageId, SessionId, SessionSummary, Timestamp,
};

use crate::error::EngineError;
use crate::store::{MessageDraft, MessageStore};

/// Broadcast channel capacity for domain events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// ConversationSession
// =============================================================================

/// A single conversation: metadata plus its exclusively-owned message log.
#[derive(Clone, Debug)]
pub struct ConversationSession {
    pub id: SessionId,
    pub title: String,
    pub tags: BTreeSet<String>,
    pub is_starred: bool,
    pub created_at: Timestamp,
    /// Creation time of the latest message; equals `created_at` while the
    /// session is empty. Recomputed on every append.
    pub last_activity_at: Timestamp,
    store: MessageStore,
}

impl ConversationSession {
    fn new(title: String, max_message_length: usize) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            title,
            tags: BTreeSet::new(),
            is_starred: false,
            created_at: now,
            last_activity_at: now,
            store: MessageStore::new(max_message_length),
        }
    }

    /// All messages in creation order.
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// Content of the latest message, empty for a fresh session.
    pub fn preview(&self) -> &str {
        self.store.latest().map(|m| m.content.as_str()).unwrap_or("")
    }

    /// Listing projection for history views.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            title: self.title.clone(),
            preview: self.preview().to_string(),
            message_count: self.message_count(),
            is_starred: self.is_starred,
            tags: self.tags.iter().cloned().collect(),
            last_activity_at: self.last_activity_at,
        }
    }

    /// Case-insensitive substring match against title, latest-message
    /// preview, and tags (OR across the three).
    fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.preview().to_lowercase().contains(needle_lower)
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(needle_lower))
    }
}

// =============================================================================
// SessionRegistry
// =============================================================================

/// Owns all sessions and serializes mutations behind one mutex.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, ConversationSession>>,
    event_tx: broadcast::Sender<DomainEvent>,
    config: ChatConfig,
}

impl SessionRegistry {
    pub fn new(config: ChatConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            sessions: Mutex::new(HashMap::new()),
            event_tx,
            config,
        }
    }

    /// Subscribe to domain events emitted by this registry.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Create an empty session. Without a title, the configured default
    /// ("Untitled conversation") is assigned.
    pub fn create(&self, initial_title: Option<&str>) -> Result<SessionId, EngineError> {
        let title = match initial_title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self.config.default_title.clone(),
        };
        let session = ConversationSession::new(title.clone(), self.config.max_message_length);
        let id = session.id;
        let created_at = session.created_at;
        self.lock()?.insert(id, session);
        self.emit(DomainEvent::SessionCreated {
            session_id: id,
            title,
            timestamp: created_at,
        });
        tracing::debug!(session_id = %id, "Session created");
        Ok(id)
    }

    /// Fetch a session by id.
    pub fn get(&self, id: SessionId) -> Result<ConversationSession, EngineError> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(id))
    }

    /// Search sessions by case-insensitive substring over title, preview,
    /// and tags. An empty or whitespace-only query returns every session.
    ///
    /// Results are ordered by descending last activity; equal timestamps
    /// are broken by ascending session id so the listing is deterministic.
    pub fn search(&self, query: &str) -> Result<Vec<ConversationSession>, EngineError> {
        let needle = query.trim().to_lowercase();
        let mut results: Vec<ConversationSession> = {
            let sessions = self.lock()?;
            sessions
                .values()
                .filter(|s| needle.is_empty() || s.matches(&needle))
                .cloned()
                .collect()
        };
        results.sort_by(|a, b| {
            b.last_activity_at
                .cmp(&a.last_activity_at)
                .then(a.id.cmp(&b.id))
        });
        Ok(results)
    }

    /// Search projected to listing summaries.
    pub fn search_summaries(&self, query: &str) -> Result<Vec<SessionSummary>, EngineError> {
        Ok(self.search(query)?.iter().map(|s| s.summary()).collect())
    }

    /// Flip the star flag and return the new value.
    pub fn toggle_star(&self, id: SessionId) -> Result<bool, EngineError> {
        let (is_starred, now) = {
            let mut sessions = self.lock()?;
            let session = sessions
                .get_mut(&id)
                .ok_or(EngineError::SessionNotFound(id))?;
            session.is_starred = !session.is_starred;
            (session.is_starred, Timestamp::now())
        };
        self.emit(DomainEvent::SessionStarToggled {
            session_id: id,
            is_starred,
            timestamp: now,
        });
        Ok(is_starred)
    }

    /// Replace the session title.
    pub fn rename(&self, id: SessionId, title: &str) -> Result<(), EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::EmptyTitle);
        }
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&id)
            .ok_or(EngineError::SessionNotFound(id))?;
        session.title = title.to_string();
        Ok(())
    }

    /// Replace the session's tag set. Tags are trimmed; empty tags dropped.
    pub fn set_tags(&self, id: SessionId, tags: Vec<String>) -> Result<(), EngineError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&id)
            .ok_or(EngineError::SessionNotFound(id))?;
        session.tags = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(())
    }

    /// Delete a session and its messages. Deleting twice fails the second
    /// time with `SessionNotFound`.
    pub fn delete(&self, id: SessionId) -> Result<(), EngineError> {
        let removed = self
            .lock()?
            .remove(&id)
            .ok_or(EngineError::SessionNotFound(id))?;
        self.emit(DomainEvent::SessionDeleted {
            session_id: id,
            message_count: removed.message_count(),
            timestamp: Timestamp::now(),
        });
        tracing::debug!(session_id = %id, "Session deleted");
        Ok(())
    }

    /// Append a message to a session's log and refresh its last-activity
    /// time from the appended message.
    pub fn append_message(
        &self,
        id: SessionId,
        draft: MessageDraft,
    ) -> Result<Message, EngineError> {
        let message = {
            let mut sessions = self.lock()?;
            let session = sessions
                .get_mut(&id)
                .ok_or(EngineError::SessionNotFound(id))?;
            let message = session.store.append(draft)?;
            session.last_activity_at = message.created_at;
            message
        };
        self.emit(DomainEvent::MessageAppended {
            session_id: id,
            message_id: message.id,
            role: message.role,
            timestamp: message.created_at,
        });
        Ok(message)
    }

    /// Record feedback on an assistant message within a session.
    pub fn set_feedback(
        &self,
        id: SessionId,
        message_id: MessageId,
        feedback: Feedback,
    ) -> Result<(), EngineError> {
        {
            let mut sessions = self.lock()?;
            let session = sessions
                .get_mut(&id)
                .ok_or(EngineError::SessionNotFound(id))?;
            session.store.set_feedback(message_id, feedback)?;
        }
        self.emit(DomainEvent::FeedbackRecorded {
            session_id: id,
            message_id,
            feedback,
            timestamp: Timestamp::now(),
        });
        Ok(())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Internal --

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, ConversationSession>>, EngineError>
    {
        self.sessions
            .lock()
            .map_err(|e| EngineError::Internal(format!("session lock poisoned: {}", e)))
    }

    /// Send an event; receivers may or may not exist.
    pub(crate) fn emit(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================
