//! Turn storage for one conversation.
//!
//! A session keeps every turn exchanged so far. Turns are only ever
//! appended, never edited or removed.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use relance_core::{Role, Turn};

#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Session identifier
    pub id: Uuid,
    /// Client the session speaks for
    pub client_id: String,
    turns: Vec<Turn>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            client_id: client_id.into(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn and return it.
    pub fn push(&mut self, role: Role, text: impl Into<String>) -> &Turn {
        let now = Utc::now();
        let index = self.turns.len();
        self.turns.push(Turn {
            role,
            text: text.into(),
            index,
            created_at: now,
        });
        self.updated_at = now;
        &self.turns[index]
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub const fn turn_count(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
