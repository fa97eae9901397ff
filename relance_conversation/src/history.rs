//! Bounded history window.
//!
//! Only the most recent turns are rendered into the backend prompt; the
//! session itself keeps everything.

use relance_core::{Role, Turn};

/// A sliding window over conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    max_turns: usize,
}

impl HistoryWindow {
    #[must_use]
    pub const fn new(max_turns: usize) -> Self {
        Self { max_turns }
    }

    /// Window over `history` followed by a turn that is not appended yet.
    ///
    /// The pending turn always counts towards the limit, so the result never
    /// exceeds `max_turns` entries.
    #[must_use]
    pub fn select_with_pending(&self, history: &[Turn], pending: &Turn) -> Vec<Turn> {
        if self.max_turns == 0 {
            return Vec::new();
        }
        let start = history.len().saturating_sub(self.max_turns - 1);
        history[start..]
            .iter()
            .chain(std::iter::once(pending))
            .cloned()
            .collect()
    }
}

/// Statistics about conversation history, shown when a chat ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub agent_turns: usize,
    pub total_characters: usize,
}

impl HistoryStats {
    #[must_use]
    pub fn of(turns: &[Turn]) -> Self {
        Self {
            total_turns: turns.len(),
            user_turns: turns.iter().filter(|t| t.role == Role::User).count(),
            agent_turns: turns.iter().filter(|t| t.role == Role::Agent).count(),
            total_characters: turns.iter().map(|t| t.text.chars().count()).sum(),
        }
    }
}
