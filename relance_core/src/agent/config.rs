//! Agent-wide settings shared by every session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Closing phrases used when the configuration does not list any.
pub const DEFAULT_CLOSING_WORDS: &[&str] = &[
    "goodbye",
    "bye",
    "see you",
    "that's all",
    "hang up",
    "au revoir",
    "à bientôt",
];

/// The `agent` section of the configuration.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// session orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentConfig {
    /// Backend model identifier
    #[serde(default = "AgentConfig::default_model")]
    pub model: String,
    /// Number of most recent turns rendered into backend context
    #[serde(default = "AgentConfig::default_max_history")]
    pub max_history: usize,
    /// Phrases that mark the end of a conversation (matched case-insensitively)
    #[serde(default = "AgentConfig::default_closing_words")]
    pub closing_words: Vec<String>,
    /// Upper bound on a single backend round-trip, retries included
    #[serde(default = "AgentConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AgentConfig {
    fn default_model() -> String {
        "gemini-1.5-flash".to_string()
    }

    const fn default_max_history() -> usize {
        10
    }

    fn default_closing_words() -> Vec<String> {
        DEFAULT_CLOSING_WORDS
            .iter()
            .map(|w| (*w).to_string())
            .collect()
    }

    const fn default_request_timeout_secs() -> u64 {
        30
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    #[must_use]
    pub fn with_closing_words(mut self, words: Vec<String>) -> Self {
        self.closing_words = words;
        self
    }

    #[must_use]
    pub const fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            max_history: Self::default_max_history(),
            closing_words: Self::default_closing_words(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: AgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.closing_words.iter().any(|w| w == "goodbye"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config: AgentConfig = serde_json::from_str(
            r#"{"model": "gemini-2.0-flash", "max_history": 4, "closing_words": ["ciao"]}"#,
        )
        .unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_history, 4);
        assert_eq!(config.closing_words, vec!["ciao".to_string()]);
    }
}
