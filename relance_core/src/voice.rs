//! Canned, tone-matched utterances that never go through the backend.

use crate::{ClientProfile, Tone};

/// Reply used when the backend fails; the raw error is never shown to the client.
pub const APOLOGY: &str = "I'm sorry, something went wrong on my end. Could you please repeat that?";

/// Opening line of a session.
#[must_use]
pub fn greeting(profile: &ClientProfile) -> String {
    let name = &profile.client_name;
    match profile.tone {
        Tone::Formal => {
            format!("Good morning. I am calling on behalf of {name}. How may I help you today?")
        }
        Tone::Collaborative => format!("Hello. I am with {name}. How can I help you?"),
        Tone::Professional | Tone::Default => format!("Hello, this is {name}. How can I help you?"),
    }
}

/// Answer to "are you a robot?".
#[must_use]
pub fn identity_denial(profile: &ClientProfile) -> String {
    let name = &profile.client_name;
    match profile.tone {
        Tone::Formal => format!(
            "No, I am a professional advisor with {name}. I am here to help you with your account. How may I assist you?"
        ),
        Tone::Collaborative => format!(
            "No, not at all! I am a real person from {name}. I am here to find a solution with you. How can I help?"
        ),
        Tone::Professional | Tone::Default => format!(
            "No, I am a real advisor with {name}. I am here to discuss your account. How can I help you?"
        ),
    }
}

/// Last words when the caller ends the session.
#[must_use]
pub fn farewell(profile: &ClientProfile) -> String {
    format!(
        "Goodbye. Thank you for speaking with us. {}",
        profile.closing_line
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::profile;

    #[test]
    fn greetings_reference_client_name_per_tone() {
        for tone in [
            Tone::Formal,
            Tone::Professional,
            Tone::Collaborative,
            Tone::Default,
        ] {
            let client = profile("dell", tone);
            let text = greeting(&client);
            assert!(text.contains("dell Corp"), "{tone}: {text}");
            assert!(text.len() >= 20);
        }
        assert!(greeting(&profile("a", Tone::Formal)).starts_with("Good morning."));
    }

    #[test]
    fn default_tone_speaks_like_professional() {
        assert_eq!(
            identity_denial(&profile("a", Tone::Default)),
            identity_denial(&profile("a", Tone::Professional))
        );
        assert_eq!(
            greeting(&profile("a", Tone::Default)),
            greeting(&profile("a", Tone::Professional))
        );
        assert_ne!(
            identity_denial(&profile("a", Tone::Formal)),
            identity_denial(&profile("a", Tone::Collaborative))
        );
    }

    #[test]
    fn farewell_ends_with_closing_line() {
        let client = profile("dell", Tone::Formal);
        assert!(farewell(&client).ends_with(&client.closing_line));
    }
}
