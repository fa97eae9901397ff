#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod agent;
pub mod intent;
pub mod profile;
pub mod prompt;
pub mod util;
pub mod voice;

pub use agent::AgentConfig;
pub use intent::{IDENTITY_CHALLENGE_PHRASES, IntentClassifier, KeywordClassifier};
pub use profile::{ClientProfile, ProfileError, ProfileStore, Tone};
pub use prompt::{PromptError, assemble_system_prompt, assemble_turn_prompt};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    /// Speaker label used when a turn is rendered into backend context.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "Client",
            Self::Agent => "Agent",
        }
    }
}

/// One utterance in a session. Never mutated once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Zero-based position in the owning session.
    pub index: usize,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.text)
    }
}

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Hosted text generation: one prompt in, generated text out.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
    fn model(&self) -> &str;
}

#[async_trait]
impl<T: GenerativeBackend + ?Sized> GenerativeBackend for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).generate(prompt).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
