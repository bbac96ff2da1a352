// Reconstruction - rebuild the dashboard by replaying the chat transcript

use super::reducer::reduce_at;
use crate::models::{ChatMessage, DashboardState};
use crate::parsers::{EntityExtractor, HeuristicExtractor};
use serde::{Deserialize, Serialize};

/// How much of the transcript a reconstruction replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionMode {
    /// Fold every message that carries an analysis, oldest first
    #[default]
    FullReplay,
    /// Apply only the most recent analysis to an empty dashboard
    LatestOnly,
}

impl ReconstructionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconstructionMode::FullReplay => "full_replay",
            ReconstructionMode::LatestOnly => "latest_only",
        }
    }
}

impl std::fmt::Display for ReconstructionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReconstructionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "full_replay" | "full" => Ok(ReconstructionMode::FullReplay),
            "latest_only" | "latest" => Ok(ReconstructionMode::LatestOnly),
            _ => Err(format!(
                "Invalid reconstruction mode: '{}'. Expected 'full_replay' or 'latest_only'",
                s
            )),
        }
    }
}

/// Rebuild dashboard state from `transcript` with the default extractor.
pub fn reconstruct(transcript: &[ChatMessage], mode: ReconstructionMode) -> DashboardState {
    reconstruct_with(transcript, mode, &HeuristicExtractor)
}

/// Rebuild dashboard state from `transcript`.
///
/// Each replayed analysis is stamped with the time of the message that
/// carried it, so replaying one message gives exactly what the reducer
/// produced when that message arrived.
pub fn reconstruct_with<E: EntityExtractor + ?Sized>(
    transcript: &[ChatMessage],
    mode: ReconstructionMode,
    extractor: &E,
) -> DashboardState {
    let mut state = DashboardState {
        user_company: find_user_company(transcript, extractor),
        ..Default::default()
    };

    let carriers: Vec<usize> = transcript
        .iter()
        .enumerate()
        .filter(|(_, msg)| msg.has_intelligence())
        .map(|(idx, _)| idx)
        .collect();

    let replayed = match mode {
        ReconstructionMode::FullReplay => &carriers[..],
        ReconstructionMode::LatestOnly => &carriers[carriers.len().saturating_sub(1)..],
    };

    for &idx in replayed {
        let msg = &transcript[idx];
        let Some(payload) = msg.attached_intelligence.as_ref() else {
            continue;
        };

        match resolve_target(transcript, idx, extractor) {
            Some(target) => state = reduce_at(&state, payload, &target, msg.timestamp),
            None => log::warn!("Skipping analysis in message {}: no target company found", msg.id),
        }
    }

    log::info!(
        "Reconstructed dashboard from {} message(s) ({}, {} analysis replayed)",
        transcript.len(),
        mode,
        replayed.len()
    );
    state
}

/// Company named by the earliest self-referential user message that names one.
pub fn find_user_company<E: EntityExtractor + ?Sized>(
    transcript: &[ChatMessage],
    extractor: &E,
) -> Option<String> {
    transcript
        .iter()
        .filter(|msg| msg.is_user())
        .filter(|msg| extractor.extract(&msg.content).is_self_referential)
        .find_map(|msg| extractor.extract_user_company(&msg.content))
}

/// Target for the analysis at `idx`: named in the message itself, else in the
/// closest earlier user message that names one.
fn resolve_target<E: EntityExtractor + ?Sized>(
    transcript: &[ChatMessage],
    idx: usize,
    extractor: &E,
) -> Option<String> {
    extractor.extract(&transcript[idx].content).company.or_else(|| {
        transcript[..idx]
            .iter()
            .rev()
            .filter(|msg| msg.is_user())
            .find_map(|msg| extractor.extract(&msg.content).company)
    })
}
