// Chat orchestrator - runs one user turn from extraction through persistence

use super::backend::{IntelligenceBackend, IntelligenceRequest};
use crate::dashboard::{BootstrapSource, DashboardStore, ReconstructionMode};
use crate::file_storage::{chat::cap_history, TranscriptRepository};
use crate::models::{ChatMessage, DashboardState, IntelligencePayload};
use crate::parsers::{normalize, EntityExtractor, HeuristicExtractor};
use crate::utils::lock_mutex_recover;
use std::sync::Mutex;

/// Reply when a turn names no company and none was discussed before
pub const DEFAULT_CLARIFICATION_PROMPT: &str =
    "Which company would you like me to research? Tell me the name and, if you like, what you're selling them.";

/// Reply when the intelligence backend fails
pub const BACKEND_FAILURE_REPLY: &str =
    "Sorry, I couldn't retrieve intelligence right now. Your dashboard is unchanged; please try again.";

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The backend analysed `target` and the dashboard was updated
    Analyzed {
        target: String,
        reply: ChatMessage,
        state: DashboardState,
    },
    /// No target could be identified; the user was asked for one
    Clarification { reply: ChatMessage },
    /// The backend call failed; the dashboard was left alone
    BackendFailed {
        target: String,
        reply: ChatMessage,
        error: String,
    },
}

impl TurnOutcome {
    /// The assistant message appended for this turn.
    pub fn reply(&self) -> &ChatMessage {
        match self {
            TurnOutcome::Analyzed { reply, .. }
            | TurnOutcome::Clarification { reply }
            | TurnOutcome::BackendFailed { reply, .. } => reply,
        }
    }
}

/// Sequences chat turns against the dashboard.
///
/// Turns are serialized: a second turn waits until the first has applied its
/// result, so backend requests never overlap and the dashboard sees analyses
/// in the order the user asked for them.
pub struct ChatOrchestrator<B, E = HeuristicExtractor> {
    backend: B,
    extractor: E,
    dashboard: DashboardStore,
    transcript_repo: TranscriptRepository,
    transcript: Mutex<Vec<ChatMessage>>,
    turn_guard: tokio::sync::Mutex<()>,
    mode: ReconstructionMode,
    clarification_prompt: String,
}

impl<B: IntelligenceBackend> ChatOrchestrator<B, HeuristicExtractor> {
    pub fn new(backend: B, dashboard: DashboardStore, transcript_repo: TranscriptRepository) -> Self {
        Self::with_extractor(backend, HeuristicExtractor, dashboard, transcript_repo)
    }
}

impl<B: IntelligenceBackend, E: EntityExtractor> ChatOrchestrator<B, E> {
    pub fn with_extractor(
        backend: B,
        extractor: E,
        dashboard: DashboardStore,
        transcript_repo: TranscriptRepository,
    ) -> Self {
        Self {
            backend,
            extractor,
            dashboard,
            transcript_repo,
            transcript: Mutex::new(Vec::new()),
            turn_guard: tokio::sync::Mutex::new(()),
            mode: ReconstructionMode::default(),
            clarification_prompt: DEFAULT_CLARIFICATION_PROMPT.to_string(),
        }
    }

    pub fn with_reconstruction_mode(mut self, mode: ReconstructionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_clarification_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.clarification_prompt = prompt.into();
        self
    }

    /// Load the transcript and restore (or rebuild) the dashboard.
    pub fn bootstrap(&self) -> BootstrapSource {
        let transcript = self.transcript_repo.load();
        let source = self.dashboard.bootstrap(&transcript, self.mode, &self.extractor);
        log::info!(
            "Bootstrapped from {:?} with {} transcript message(s)",
            source,
            transcript.len()
        );
        *lock_mutex_recover(&self.transcript) = transcript;
        source
    }

    /// Current dashboard state.
    pub fn state(&self) -> DashboardState {
        self.dashboard.state()
    }

    /// Messages of the conversation so far, oldest first.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock_mutex_recover(&self.transcript).clone()
    }

    /// Whether a turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.turn_guard.try_lock().is_err()
    }

    /// Process one user utterance.
    pub async fn handle_user_turn(&self, text: &str) -> TurnOutcome {
        let _turn = self.turn_guard.lock().await;

        self.record(ChatMessage::user(text));

        let entities = self.extractor.extract(text);
        if entities.is_self_referential {
            if let Some(company) = self.extractor.extract_user_company(text) {
                self.dashboard.resolve_user_company(&company);
            }
        }

        let state = self.dashboard.state();
        let target = entities
            .company
            .or_else(|| state.latest_target().map(str::to_string));

        let Some(target) = target else {
            log::debug!("No target company in turn, asking for one");
            let reply = ChatMessage::assistant(self.clarification_prompt.clone(), None);
            self.record(reply.clone());
            return TurnOutcome::Clarification { reply };
        };

        let request = IntelligenceRequest {
            target_company: target.clone(),
            user_company: state.user_company.clone(),
            sales_context: entities.sales_context,
            message: text.to_string(),
        };

        match self.backend.analyze(&request).await {
            Ok(raw) => {
                let payload = normalize(&raw);
                let reply =
                    ChatMessage::assistant(analysis_reply(&target, &payload), Some(payload.clone()));
                // Stamp insights with the reply's time so a replay reproduces them exactly
                let state = self
                    .dashboard
                    .apply_intelligence_at(&payload, &target, reply.timestamp);
                self.record(reply.clone());
                TurnOutcome::Analyzed {
                    target,
                    reply,
                    state,
                }
            }
            Err(e) => {
                log::warn!("Intelligence request for {} failed: {}", target, e);
                let reply = ChatMessage::assistant(BACKEND_FAILURE_REPLY, None);
                self.record(reply.clone());
                TurnOutcome::BackendFailed {
                    target,
                    reply,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Clear the dashboard, its snapshot and the transcript.
    pub async fn reset(&self) {
        let _turn = self.turn_guard.lock().await;
        lock_mutex_recover(&self.transcript).clear();
        self.transcript_repo.clear();
        self.dashboard.reset();
    }

    fn record(&self, message: ChatMessage) {
        let mut transcript = lock_mutex_recover(&self.transcript);
        transcript.push(message);

        let max_history = self.transcript_repo.max_history();
        let excess = transcript.len() - cap_history(&transcript, max_history).len();
        transcript.drain(..excess);

        self.transcript_repo.save(&transcript);
    }
}

/// Assistant text for a completed analysis.
///
/// Always names the target after "intelligence on" so that replaying the
/// transcript can recover it from the message alone.
pub fn analysis_reply(target: &str, payload: &IntelligencePayload) -> String {
    if payload.is_empty() {
        return format!(
            "Here's the latest intelligence on {}: nothing new was reported this time.",
            target
        );
    }

    let mut parts = Vec::new();
    if !payload.competitors.is_empty() {
        parts.push(format!("{} competitor(s) mapped", payload.competitors.len()));
    }
    if let Some(probability) = payload.deal_probability {
        parts.push(format!("deal probability {:.0}%", probability));
    }
    if !payload.talking_points.is_empty() {
        parts.push(format!("{} talking point(s)", payload.talking_points.len()));
    }
    if !payload.pain_points.is_empty() {
        parts.push(format!("{} pain point(s)", payload.pain_points.len()));
    }

    format!("Here's the latest intelligence on {}: {}.", target, parts.join(", "))
}
