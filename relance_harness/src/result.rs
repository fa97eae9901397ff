use std::time::Duration;

use relance_conversation::{Reply, ReplyKind};

use crate::Category;

/// Phrases showing the agent acknowledged the end of the call.
pub const CLOSING_ACKNOWLEDGEMENTS: &[&str] = &[
    "goodbye",
    "thank you",
    "see you",
    "au revoir",
    "à bientôt",
    "merci",
];

#[must_use]
pub fn is_closing_acknowledgement(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CLOSING_ACKNOWLEDGEMENTS
        .iter()
        .any(|phrase| lowered.contains(*phrase))
}

/// One scripted utterance and the agent's answer.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub user_text: String,
    pub agent_text: String,
    pub kind: ReplyKind,
    pub latency: Duration,
    /// False when the backend failed and the apology was served.
    pub success: bool,
    pub failure_reason: Option<String>,
}

impl TurnResult {
    #[must_use]
    pub fn new(user_text: impl Into<String>, reply: Reply, latency: Duration) -> Self {
        let failure_reason = reply.error.as_ref().map(|e| format!("API Error: {e}"));
        Self {
            user_text: user_text.into(),
            success: failure_reason.is_none(),
            agent_text: reply.text,
            kind: reply.kind,
            latency,
            failure_reason,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.kind == ReplyKind::Fallback
    }
}

/// Outcome of one (scenario, client, iteration) run.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub scenario: String,
    pub category: Category,
    pub client_id: String,
    pub client_name: String,
    /// 1-based.
    pub iteration: usize,
    pub greeting: Option<String>,
    pub turns: Vec<TurnResult>,
    /// No harness-level error. Fallback turns do not count against it.
    pub success: bool,
    /// The final agent utterance acknowledges the end of the call.
    pub properly_closed: bool,
    /// Sum of turn latencies.
    pub total_time: Duration,
    pub failure_reason: Option<String>,
}

impl TestResult {
    #[must_use]
    pub fn last_agent_text(&self) -> Option<&str> {
        self.turns
            .last()
            .map(|t| t.agent_text.as_str())
            .or(self.greeting.as_deref())
    }

    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_fallback()).count()
    }

    #[must_use]
    pub fn denial_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.kind == ReplyKind::IdentityDenial)
            .count()
    }
}
