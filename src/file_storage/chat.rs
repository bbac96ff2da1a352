//! Chat transcript storage
//!
//! Stores the conversation as a JSON array of messages under its own key,
//! keeping only the newest `max_history` messages.

use super::store::KeyValueStore;
use crate::models::ChatMessage;
use serde_json::Value;
use std::sync::Arc;

/// Storage key for the chat transcript
pub const DEFAULT_TRANSCRIPT_KEY: &str = "cc-intelligence-dashboard-chat";

/// Messages kept in the stored transcript
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Load/save/clear of the chat transcript. Never propagates storage errors.
#[derive(Clone)]
pub struct TranscriptRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_history: usize,
}

impl TranscriptRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: DEFAULT_TRANSCRIPT_KEY.to_string(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Cap on stored messages; 0 keeps everything.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Stored messages in order, oldest first.
    ///
    /// Individual messages that no longer parse are skipped; an unreadable
    /// transcript loads as empty.
    pub fn load(&self) -> Vec<ChatMessage> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read chat transcript: {}", e);
                return Vec::new();
            }
        };

        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Ignoring corrupt chat transcript '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        let total = entries.len();
        let messages: Vec<ChatMessage> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    log::debug!("Skipping unreadable chat message: {}", e);
                    None
                }
            })
            .collect();

        if messages.len() < total {
            log::warn!(
                "Skipped {} unreadable message(s) in chat transcript '{}'",
                total - messages.len(),
                self.key
            );
        }

        messages
    }

    /// Replace the stored transcript with the newest `max_history` of `messages`.
    pub fn save(&self, messages: &[ChatMessage]) -> bool {
        let kept = cap_history(messages, self.max_history);

        let content = match serde_json::to_string(kept) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to serialize chat transcript: {}", e);
                return false;
            }
        };

        match self.store.set(&self.key, &content) {
            Ok(()) => {
                log::debug!("Saved {} chat message(s) to '{}'", kept.len(), self.key);
                true
            }
            Err(e) => {
                log::warn!("Chat transcript not persisted: {}", e);
                false
            }
        }
    }

    /// Remove the stored transcript.
    pub fn clear(&self) -> bool {
        match self.store.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to clear chat transcript: {}", e);
                false
            }
        }
    }
}

/// The newest `max_history` messages (all of them when the cap is 0).
pub fn cap_history(messages: &[ChatMessage], max_history: usize) -> &[ChatMessage] {
    if max_history == 0 || messages.len() <= max_history {
        messages
    } else {
        &messages[messages.len() - max_history..]
    }
}
