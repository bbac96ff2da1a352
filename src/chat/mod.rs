//! Chat flow
//!
//! The orchestrator takes a user utterance through entity extraction, the
//! intelligence backend, normalization and the dashboard reducer, and keeps
//! the transcript and dashboard snapshot persisted along the way.

pub mod backend;
pub mod orchestrator;

pub use backend::{
    BackendError, HttpIntelligenceBackend, IntelligenceBackend, IntelligenceRequest,
    UnconfiguredBackend, DEFAULT_BACKEND_TIMEOUT_SECS,
};
pub use orchestrator::{
    analysis_reply, ChatOrchestrator, TurnOutcome, BACKEND_FAILURE_REPLY,
    DEFAULT_CLARIFICATION_PROMPT,
};
