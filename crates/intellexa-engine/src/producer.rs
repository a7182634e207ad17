//! Response producer seam.
//!
//! The producer is the single integration point with a real retrieval and
//! generation backend (platform connectors, vector index, LLM). The engine
//! treats a call as one unit of work: no partial results are observable
//! until it resolves or fails.

use std::time::Duration;

use async_trait::async_trait;

use intellexa_core::types::{Citation, Confidence, Message, OriginSystem};

use crate::error::EngineError;

/// Answer text plus its supporting citations for one turn.
#[derive(Clone, Debug)]
pub struct ProducerReply {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Produces an assistant reply for a user message, given the conversation
/// history. `history` already includes `prompt` as its final entry.
#[async_trait]
pub trait ResponseProducer: Send + Sync {
    async fn produce(
        &self,
        history: &[Message],
        prompt: &Message,
    ) -> Result<ProducerReply, EngineError>;
}

// =============================================================================
// CannedProducer
// =============================================================================

/// Stand-in producer that fabricates a fixed answer with two document
/// citations, optionally after an artificial delay. Used by the demo binary
/// and anywhere a real backend is not wired in.
pub struct CannedProducer {
    delay: Duration,
}

impl CannedProducer {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    /// Simulate backend latency. The demo binary reads this from config.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    fn canned_citations() -> Vec<Citation> {
        vec![
            Citation {
                title: "API Integration Guidelines".to_string(),
                source_url: "https://notion.example.com/api-integration-guidelines".to_string(),
                snippet: "The authentication flow should follow OAuth 2.0 standards..."
                    .to_string(),
                confidence: Confidence::new(0.95),
                origin: OriginSystem::Notion,
            },
            Citation {
                title: "Development Best Practices".to_string(),
                source_url: "https://confluence.example.com/dev-best-practices".to_string(),
                snippet: "When implementing new features, ensure proper error handling..."
                    .to_string(),
                confidence: Confidence::new(0.88),
                origin: OriginSystem::Confluence,
            },
        ]
    }
}

impl Default for CannedProducer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseProducer for CannedProducer {
    async fn produce(
        &self,
        _history: &[Message],
        _prompt: &Message,
    ) -> Result<ProducerReply, EngineError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(ProducerReply {
            answer: "Based on your team's documentation, I found relevant information about \
                     this topic. The implementation details are documented in several places \
                     with recent updates."
                .to_string(),
            citations: Self::canned_citations(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
