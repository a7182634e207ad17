use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A message typed by the user.
    User,
    /// A reply produced on behalf of the assistant.
    Assistant,
    /// System-injected text (announcements, state notices).
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User rating attached to an assistant reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Positive,
    Negative,
}

/// Document platform a citation was retrieved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginSystem {
    Notion,
    Gdocs,
    Confluence,
}

impl OriginSystem {
    /// Returns the display name of the platform.
    pub fn label(&self) -> &'static str {
        match self {
            OriginSystem::Notion => "Notion",
            OriginSystem::Gdocs => "Google Docs",
            OriginSystem::Confluence => "Confluence",
        }
    }
}

// =============================================================================
// Newtype Wrappers - Identifiers
// =============================================================================

/// Unique identifier for a conversation session.
///
/// Ordered by underlying UUID bytes; this ordering is used as the
/// deterministic tie-break when two sessions share a last-activity time.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a message within its session's log.
///
/// Assigned by the owning message store from a per-store sequence starting
/// at 1, so ids are strictly increasing in append order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Newtype Wrappers - Temporal / Numeric
// =============================================================================

/// Unix timestamp in milliseconds since epoch.
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

/// Retrieval confidence for a citation. Range: 0.0 (no match) to 1.0 (certain).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(pub f64);

impl Confidence {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }
}

// =============================================================================
// Core structs
// =============================================================================

/// A reference to a source document snippet backing an assistant answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Document title as shown to the user.
    pub title: String,
    /// Link to the source document.
    pub source_url: String,
    /// Excerpt supporting the answer.
    pub snippet: String,
    /// How strongly this source matched the question.
    pub confidence: Confidence,
    /// Platform the document lives on.
    pub origin: OriginSystem,
}

/// A single message in a conversation.
///
/// Immutable after creation except for `feedback`, which may be set on
/// assistant messages only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub created_at: Timestamp,
    /// Source citations, in retrieval order. Empty for user messages.
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    /// Marks an assistant reply that stands in for a failed producer call,
    /// so presentation layers can style it differently.
    pub is_error: bool,
}

/// Listing projection of a session for history views and search results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    /// Content of the latest message, empty for a fresh session.
    pub preview: String,
    pub message_count: usize,
    pub is_starred: bool,
    pub tags: Vec<String>,
    pub last_activity_at: Timestamp,
}

// =============================================================================
// Tests
// =============================================================================
