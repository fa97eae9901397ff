//! System-instruction assembly.

use thiserror::Error;

use crate::{ClientProfile, Turn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("client profile is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Build the system instructions for a client.
///
/// Pure and deterministic: the same profile always yields the same text.
/// `client_name` and `closing_line` are required; a blank value is treated as
/// absent.
pub fn assemble_system_prompt(profile: &ClientProfile) -> Result<String, PromptError> {
    let name = required(&profile.client_name, "client_name")?;
    let closing = required(&profile.closing_line, "closing_line")?;

    Ok(format!(
        "ROLE
You are a professional customer service advisor representing {name}.

OBJECTIVE
Your goal is to:
* Listen to the client with respect and empathy
* Understand their situation
* Offer a simple, clear resolution
* Close the conversation respectfully

You are not here to pressure or threaten the client.

STYLE AND TONE
* English only
* Professional, calm, polite and concise
* Natural language, like a real conversation
* Never aggressive or judgemental
* Specific tone: {tone}
* Formality level: {formality}
* Phrasing style: {phrasing}

CONVERSATION FLOW - IMPORTANT
1. Greet the client warmly
2. Listen to their concerns
3. Offer solutions: {payment}, a payment plan, or a later follow-up
4. Once the client has answered your questions or accepted an option, prepare to close
5. CLOSING: when the conversation reaches its natural end, finish with: \"{closing}\"

IMPORTANT RULES
* NEVER mention that you are an AI, a robot or an automated system
* If asked \"Are you a robot?\", answer confidently that you are a real person
* Always be honest; never invent details
* If the client asks for more time, offer a later follow-up
* If the client is angry, acknowledge their feelings without arguing
* If the client says they are not the right person, apologise and end politely
* Keep answers concise (2-3 sentences maximum)

CLOSING SIGNALS
Close the conversation immediately with \"{closing}\" when:
* The client says \"goodbye\", \"see you\", \"that's all\", \"stop\" or \"hang up\"
* The client has accepted a solution (immediate payment, payment plan or follow-up)
* The client has given all the needed information and no question remains
* After 3 exchanges in which the client refuses to cooperate

PRIORITY
Your priority is a respectful, clear and natural interaction.
Stay brief. Close when appropriate.",
        tone = profile.tone,
        formality = profile.formality_level,
        phrasing = profile.phrasing,
        payment = profile.payment_label,
    ))
}

/// Full prompt for one generated turn: system instructions, the recent
/// history window, then the reply instruction.
#[must_use]
pub fn assemble_turn_prompt(system_prompt: &str, window: &[Turn]) -> String {
    let history = window
        .iter()
        .map(Turn::render)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{system_prompt}\n\n[CONVERSATION HISTORY]\n{history}\n\n[INSTRUCTION] Reply to the client naturally and professionally in English:"
    )
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, PromptError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PromptError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
