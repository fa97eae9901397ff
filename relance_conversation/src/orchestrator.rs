//! Session orchestrator for multi-turn dialogue.
//!
//! The orchestrator is the only place that talks to the generative backend
//! on behalf of a conversation. Its contract is that [`respond`] always
//! produces a reply: backend failures and timeouts degrade to an apology,
//! and the raw error is kept on the [`Reply`] for operators only.
//!
//! [`respond`]: SessionOrchestrator::respond

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use relance_core::voice::{self, APOLOGY};
use relance_core::{
    AgentConfig, BackendError, ClientProfile, GenerativeBackend, IntentClassifier,
    KeywordClassifier, PromptError, Role, Turn, assemble_system_prompt, assemble_turn_prompt,
};

use crate::history::HistoryWindow;
use crate::session::ConversationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting turns.
    Open,
    /// The caller ended the conversation.
    Closed,
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting,
    Generated,
    IdentityDenial,
    /// Backend failed; the reply is the apology.
    Fallback,
    Farewell,
}

impl ReplyKind {
    #[must_use]
    pub const fn called_backend(self) -> bool {
        matches!(self, Self::Generated | Self::Fallback)
    }
}

/// One agent utterance plus how it was produced.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
    /// Backend failure behind a `Fallback` reply.
    pub error: Option<BackendError>,
}

impl Reply {
    fn canned(text: String, kind: ReplyKind) -> Self {
        Self {
            text,
            kind,
            error: None,
        }
    }
}

/// Drives one conversation for one client profile.
///
/// Never closes itself: the caller decides when to stop, usually after
/// [`is_closing_signal`](Self::is_closing_signal) fires, and calls
/// [`close`](Self::close).
pub struct SessionOrchestrator<B = Arc<dyn GenerativeBackend>, C = KeywordClassifier> {
    backend: B,
    classifier: C,
    profile: Arc<ClientProfile>,
    system_prompt: String,
    window: HistoryWindow,
    request_timeout: Duration,
    session: ConversationSession,
    state: SessionState,
}

impl<B> SessionOrchestrator<B, KeywordClassifier>
where
    B: GenerativeBackend,
{
    /// Fails only when the profile cannot produce a system prompt.
    pub fn new(
        backend: B,
        profile: Arc<ClientProfile>,
        config: &AgentConfig,
    ) -> Result<Self, PromptError> {
        let system_prompt = assemble_system_prompt(&profile)?;
        let session = ConversationSession::new(profile.id.clone());

        info!(
            "Creating session {} for client {} (history window: {} turns)",
            session.id, profile.id, config.max_history
        );

        Ok(Self {
            backend,
            classifier: KeywordClassifier::new(&config.closing_words),
            profile,
            system_prompt,
            window: HistoryWindow::new(config.max_history),
            request_timeout: config.request_timeout(),
            session,
            state: SessionState::Open,
        })
    }
}

impl<B, C> SessionOrchestrator<B, C>
where
    B: GenerativeBackend,
    C: IntentClassifier,
{
    /// Swap the intent matcher.
    #[must_use]
    pub fn with_classifier<D: IntentClassifier>(self, classifier: D) -> SessionOrchestrator<B, D> {
        SessionOrchestrator {
            backend: self.backend,
            classifier,
            profile: self.profile,
            system_prompt: self.system_prompt,
            window: self.window,
            request_timeout: self.request_timeout,
            session: self.session,
            state: self.state,
        }
    }

    /// Tone-matched greeting, recorded as the first agent turn. No backend call.
    pub fn start(&mut self) -> Reply {
        let greeting = voice::greeting(&self.profile);
        if self.session.is_empty() {
            self.session.push(Role::Agent, greeting.clone());
        } else {
            warn!(
                "start() called on session {} with {} turns; greeting not recorded again",
                self.session.id,
                self.session.turn_count()
            );
        }
        Reply::canned(greeting, ReplyKind::Greeting)
    }

    /// Answer one user utterance. Never fails.
    ///
    /// Turns are appended only once the reply is known, so dropping this
    /// future mid-call leaves the history untouched.
    pub async fn respond(&mut self, utterance: &str) -> Reply {
        if self.state == SessionState::Closed {
            debug!("Session {} is closed, repeating farewell", self.session.id);
            let farewell = voice::farewell(&self.profile);
            return self.record(utterance, Reply::canned(farewell, ReplyKind::Farewell));
        }

        if self.classifier.is_identity_challenge(utterance) {
            debug!(
                "Identity challenge detected in session {}, using preset response",
                self.session.id
            );
            let denial = voice::identity_denial(&self.profile);
            return self.record(utterance, Reply::canned(denial, ReplyKind::IdentityDenial));
        }

        let prompt = self.build_prompt(utterance);
        let outcome = match tokio::time::timeout(self.request_timeout, self.backend.generate(&prompt))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.request_timeout)),
        };

        let reply = match outcome {
            Ok(text) => {
                debug!("Generated response ({} chars)", text.len());
                Reply::canned(text, ReplyKind::Generated)
            }
            Err(e) => {
                warn!(
                    "Backend error in session {} (client {}): {e}",
                    self.session.id, self.profile.id
                );
                Reply {
                    text: APOLOGY.to_string(),
                    kind: ReplyKind::Fallback,
                    error: Some(e),
                }
            }
        };
        self.record(utterance, reply)
    }

    /// End the conversation with the farewell and closing line.
    pub fn close(&mut self) -> Reply {
        let farewell = voice::farewell(&self.profile);
        self.session.push(Role::Agent, farewell.clone());
        self.state = SessionState::Closed;
        info!(
            "Session {} closed after {} turns",
            self.session.id,
            self.session.turn_count()
        );
        Reply::canned(farewell, ReplyKind::Farewell)
    }

    #[must_use]
    pub fn is_closing_signal(&self, text: &str) -> bool {
        self.classifier.is_closing_signal(text)
    }

    #[must_use]
    pub fn is_identity_challenge(&self, text: &str) -> bool {
        self.classifier.is_identity_challenge(text)
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn session(&self) -> &ConversationSession {
        &self.session
    }

    #[must_use]
    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// System prompt, the recent window ending with `utterance`, and the
    /// reply instruction.
    fn build_prompt(&self, utterance: &str) -> String {
        let pending = Turn {
            role: Role::User,
            text: utterance.to_string(),
            index: self.session.turn_count(),
            created_at: Utc::now(),
        };
        let window = self
            .window
            .select_with_pending(self.session.turns(), &pending);
        assemble_turn_prompt(&self.system_prompt, &window)
    }

    fn record(&mut self, utterance: &str, reply: Reply) -> Reply {
        self.session.push(Role::User, utterance);
        self.session.push(Role::Agent, reply.text.clone());
        reply
    }
}
