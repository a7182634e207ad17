//! HTTP surface for the Intellexa conversation engine.
//!
//! Exposes session listing/search, the turn cycle (submit/cancel), message
//! feedback, and a server-sent-events stream of domain events. Consumed by
//! the web presentation layer, which owns no conversation state of its own.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
