//! Keyword-based intent detection.
//!
//! Both predicates are case-insensitive substring tests. A phrase can match
//! inside an unrelated word; that trade-off is accepted in exchange for
//! predictable, auditable behaviour. Callers depend on [`IntentClassifier`]
//! so a more precise matcher can replace [`KeywordClassifier`] later.

/// Phrases asking whether the agent is automated, in English (target
/// language) and French (fallback language). Stored lowercase.
pub const IDENTITY_CHALLENGE_PHRASES: &[&str] = &[
    // English
    "are you a robot",
    "are you a bot",
    "are you a machine",
    "are you an ai",
    "are you automated",
    "is this automated",
    "is this a robot",
    "is this a bot",
    "are you human",
    "am i talking to a human",
    "am i speaking to a human",
    "real person",
    "real human",
    "artificial intelligence",
    "chatbot",
    // French
    "êtes-vous un robot",
    "vous êtes un robot",
    "c'est un robot",
    "vous êtes automat",
    "vous êtes une ia",
    "vous êtes une machine",
    "intelligence artificielle",
    "vraie personne",
    "personne réelle",
];

pub trait IntentClassifier: Send + Sync {
    /// The user wants to end the conversation.
    fn is_closing_signal(&self, text: &str) -> bool;

    /// The user asks whether they are talking to a machine.
    fn is_identity_challenge(&self, text: &str) -> bool;
}

/// Substring matcher over a configured closing list and the fixed
/// identity-challenge list.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    closing_phrases: Vec<String>,
}

impl KeywordClassifier {
    #[must_use]
    pub fn new<S: AsRef<str>>(closing_phrases: &[S]) -> Self {
        let closing_phrases = closing_phrases
            .iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { closing_phrases }
    }
}

impl IntentClassifier for KeywordClassifier {
    fn is_closing_signal(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.closing_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }

    fn is_identity_challenge(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        IDENTITY_CHALLENGE_PHRASES
            .iter()
            .any(|phrase| lowered.contains(*phrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> KeywordClassifier {
        KeywordClassifier::new(&["goodbye", "That's all", "au revoir", "  "])
    }

    #[test]
    fn closing_signal_ignores_case() {
        let c = classifier();
        assert!(c.is_closing_signal("Goodbye"));
        assert!(c.is_closing_signal("GOODBYE"));
        assert!(c.is_closing_signal("ok, that's all for today"));
        assert!(c.is_closing_signal("Je dois y aller, AU REVOIR"));
        assert!(!c.is_closing_signal("I can pay tomorrow."));
        assert!(!c.is_closing_signal("Hello."));
    }

    #[test]
    fn blank_closing_phrases_are_dropped() {
        let c = classifier();
        assert!(!c.is_closing_signal("anything at all"));
        assert!(!c.is_closing_signal("   "));
        assert!(!c.is_closing_signal(""));
    }

    #[test]
    fn identity_challenge_in_both_languages() {
        let c = classifier();
        assert!(c.is_identity_challenge("Are you a robot?"));
        assert!(c.is_identity_challenge("wait... is this AUTOMATED?"));
        assert!(c.is_identity_challenge("Am I talking to a real person?"));
        assert!(c.is_identity_challenge("Vous êtes un robot ?"));
        assert!(c.is_identity_challenge("ÊTES-VOUS UN ROBOT"));
        assert!(c.is_identity_challenge("C'est une vraie personne?"));
    }

    #[test]
    fn ordinary_utterances_are_not_challenges() {
        let c = classifier();
        assert!(!c.is_identity_challenge("I can pay tomorrow."));
        assert!(!c.is_identity_challenge("Hello."));
        assert!(!c.is_identity_challenge("I want to speak to a manager."));
        assert!(!c.is_identity_challenge("Je veux payer"));
    }

    #[test]
    fn empty_closing_list_never_closes() {
        let c = KeywordClassifier::new::<&str>(&[]);
        assert!(!c.is_closing_signal("goodbye"));
    }
}
