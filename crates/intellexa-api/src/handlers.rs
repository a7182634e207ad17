//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query/path parameters via axum extractors, calls
//! into the controller or registry, and returns JSON responses.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use intellexa_core::types::{
    Citation, Feedback, Message, MessageId, OriginSystem, Role, SessionId, SessionSummary,
    Timestamp,
};
use intellexa_engine::TurnOutcome;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Query / request parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionsParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: Feedback,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub session_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CitationResponse {
    pub title: String,
    pub source_url: String,
    pub snippet: String,
    pub confidence: f64,
    pub origin: OriginSystem,
    pub origin_label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub citations: Vec<CitationResponse>,
    pub feedback: Option<Feedback>,
    pub is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub preview: String,
    pub message_count: usize,
    pub is_starred: bool,
    pub tags: Vec<String>,
    pub last_activity_at: DateTime<Utc>,
    /// Human rendering of last activity, e.g. "30m ago".
    pub time_ago: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummaryResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub tags: Vec<String>,
    pub is_starred: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// "answered", "failed", or "cancelled".
    pub outcome: String,
    pub message: Option<MessageResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StarResponse {
    pub is_starred: bool,
}

// =============================================================================
// Response mapping
// =============================================================================

fn citation_response(citation: &Citation) -> CitationResponse {
    CitationResponse {
        title: citation.title.clone(),
        source_url: citation.source_url.clone(),
        snippet: citation.snippet.clone(),
        confidence: citation.confidence.0,
        origin: citation.origin,
        origin_label: citation.origin.label().to_string(),
    }
}

fn message_response(message: &Message) -> MessageResponse {
    MessageResponse {
        id: message.id.0,
        role: message.role,
        content: message.content.clone(),
        created_at: message.created_at.to_datetime(),
        citations: message.citations.iter().map(citation_response).collect(),
        feedback: message.feedback,
        is_error: message.is_error,
    }
}

fn summary_response(summary: &SessionSummary) -> SessionSummaryResponse {
    SessionSummaryResponse {
        id: summary.id.0,
        title: summary.title.clone(),
        preview: summary.preview.clone(),
        message_count: summary.message_count,
        is_starred: summary.is_starred,
        tags: summary.tags.clone(),
        last_activity_at: summary.last_activity_at.to_datetime(),
        time_ago: time_ago(summary.last_activity_at),
    }
}

/// Render a timestamp relative to now: "Just now", "5m ago", "2h ago", "3d ago".
fn time_ago(ts: Timestamp) -> String {
    let diff_minutes = (Timestamp::now().0 - ts.0) / 60_000;
    if diff_minutes < 1 {
        "Just now".to_string()
    } else if diff_minutes < 60 {
        format!("{}m ago", diff_minutes)
    } else if diff_minutes < 1440 {
        format!("{}h ago", diff_minutes / 60)
    } else {
        format!("{}d ago", diff_minutes / 1440)
    }
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness plus basic counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        session_count: state.registry().len(),
    })
}

/// GET /sessions?q= - list or search session summaries.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionsParams>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    let summaries = state.registry().search_summaries(&query)?;
    Ok(Json(SessionsResponse {
        sessions: summaries.iter().map(summary_response).collect(),
    }))
}

/// POST /sessions - create a session; body and title are optional.
pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<SessionSummaryResponse>), ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let id = state.controller.create_session(request.title.as_deref())?;
    let session = state.registry().get(id)?;
    Ok((StatusCode::CREATED, Json(summary_response(&session.summary()))))
}

/// GET /sessions/{id} - session metadata with its full message log.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, ApiError> {
    let session = state.registry().get(SessionId(id))?;
    Ok(Json(SessionDetailResponse {
        id: session.id.0,
        title: session.title.clone(),
        tags: session.tags.iter().cloned().collect(),
        is_starred: session.is_starred,
        created_at: session.created_at.to_datetime(),
        last_activity_at: session.last_activity_at.to_datetime(),
        messages: session.messages().iter().map(message_response).collect(),
    }))
}

/// DELETE /sessions/{id} - delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.controller.delete_session(SessionId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/{id}/star - flip the star flag.
pub async fn toggle_star(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StarResponse>, ApiError> {
    let is_starred = state.registry().toggle_star(SessionId(id))?;
    Ok(Json(StarResponse { is_starred }))
}

/// PUT /sessions/{id}/title - rename a session.
pub async fn rename_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TitleRequest>,
) -> Result<StatusCode, ApiError> {
    state.registry().rename(SessionId(id), &request.title)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /sessions/{id}/tags - replace a session's tags.
pub async fn set_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TagsRequest>,
) -> Result<StatusCode, ApiError> {
    state.registry().set_tags(SessionId(id), request.tags)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /sessions/{id}/messages - messages in creation order.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let session = state.registry().get(SessionId(id))?;
    Ok(Json(MessagesResponse {
        messages: session.messages().iter().map(message_response).collect(),
    }))
}

/// POST /sessions/{id}/messages - submit a user message and run the turn.
pub async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let outcome = state.controller.submit(SessionId(id), &request.content).await?;
    let (outcome_name, message) = match &outcome {
        TurnOutcome::Answered(m) => ("answered", Some(message_response(m))),
        TurnOutcome::Failed(m) => ("failed", Some(message_response(m))),
        TurnOutcome::Cancelled => ("cancelled", None),
    };
    Ok(Json(SubmitResponse {
        outcome: outcome_name.to_string(),
        message,
    }))
}

/// POST /sessions/{id}/cancel - cancel the pending turn.
pub async fn cancel_turn(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.controller.cancel(SessionId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/{id}/messages/{message_id}/feedback - rate a reply.
pub async fn record_feedback(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, u64)>,
    Json(request): Json<FeedbackRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .controller
        .feedback(SessionId(id), MessageId(message_id), request.feedback)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /stream - server-sent events of engine domain events.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.registry().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().event(event.event_name()).data(data)))
        }
        // Lagged receivers drop missed events and continue.
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

// =============================================================================
// Tests
// =============================================================================
