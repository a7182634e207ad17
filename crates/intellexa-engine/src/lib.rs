//! Conversation engine for Intellexa.
//!
//! Owns conversation state (sessions and their message logs), runs the
//! user-submission-to-assistant-reply turn cycle against a pluggable
//! response producer, and emits domain events for real-time consumers.

pub mod controller;
pub mod error;
pub mod notify;
pub mod producer;
pub mod registry;
pub mod store;

pub use controller::{ConversationController, TurnOutcome};
pub use error::EngineError;
pub use notify::{LogNotificationSink, NotificationSink};
pub use producer::{CannedProducer, ProducerReply, ResponseProducer};
pub use registry::{ConversationSession, SessionRegistry};
pub use store::{MessageDraft, MessageStore};
