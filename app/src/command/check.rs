use relance_core::voice::greeting;
use relance_core::{GenerativeBackend, IntentClassifier, KeywordClassifier, assemble_system_prompt};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use super::AppContext;

const CLOSING_CASES: &[(&str, bool)] = &[
    ("Goodbye", true),
    ("See you soon", true),
    ("I have to go, bye", true),
    ("Yes, I can pay tomorrow", false),
    ("Hello", false),
];

const IDENTITY_CASES: &[(&str, bool)] = &[
    ("Are you a robot?", true),
    ("Êtes-vous un robot ?", true),
    ("I can pay tomorrow.", false),
];

/// Strategy for the pre-flight self-test.
#[derive(Debug, Clone, Copy)]
pub struct CheckStrategy;

impl super::CommandStrategy for CheckStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let ctx = AppContext::load(input.as_deref())?;
        let backend = ctx.backend()?;
        if run_preflight(&ctx, backend.as_ref()).await {
            println!("✓ Pre-flight test completed successfully!\n");
            Ok(())
        } else {
            anyhow::bail!("pre-flight test failed")
        }
    }
}

fn step(label: &str) {
    if let Err(e) = write_step(&mut std::io::stdout().lock(), label) {
        warn!("Cannot write step label: {e}");
    }
}

fn write_step(out: &mut impl Write, label: &str) -> std::io::Result<()> {
    write!(out, "{label}... ")?;
    out.flush()
}

fn report(passed: bool, detail: &str) -> bool {
    if passed {
        println!("✓ PASS ({detail})\n");
    } else {
        println!("✗ FAIL ({detail})\n");
    }
    passed
}

/// Backend, configuration, canned utterances, and intent matching.
///
/// Prints one line per step and returns whether every step passed.
pub(super) async fn run_preflight(ctx: &AppContext, backend: &dyn GenerativeBackend) -> bool {
    println!("=== Pre-flight Self-test ===\n");
    let mut all_passed = true;

    step(&format!("[1/5] Backend connectivity ({})", backend.model()));
    let timeout = ctx.config.agent.request_timeout();
    let answer =
        tokio::time::timeout(timeout, backend.generate("Reply with the single word OK.")).await;
    all_passed &= match answer {
        Ok(Ok(text)) if !text.trim().is_empty() => report(true, "backend answered"),
        Ok(Ok(_)) => report(false, "empty response"),
        Ok(Err(e)) => {
            warn!("Pre-flight backend error: {e}");
            report(false, &e.to_string())
        }
        Err(_) => report(false, &format!("no response within {timeout:?}")),
    };

    step("[2/5] Configuration");
    let ids: Vec<&str> = ctx.profiles.ids().collect();
    all_passed &= report(
        !ids.is_empty(),
        &format!("{} clients loaded: {}", ids.len(), ids.join(", ")),
    );

    step("[3/5] Greetings and system prompts");
    let broken: Vec<String> = ctx
        .profiles
        .iter()
        .filter_map(|profile| {
            if greeting(profile).chars().count() < 20 {
                return Some(format!("{}: greeting too short", profile.id));
            }
            assemble_system_prompt(profile)
                .err()
                .map(|e| format!("{}: {e}", profile.id))
        })
        .collect();
    all_passed &= if broken.is_empty() {
        report(true, "all clients ready")
    } else {
        report(false, &broken.join("; "))
    };

    let classifier = KeywordClassifier::new(&ctx.config.agent.closing_words);

    step("[4/5] Closing-signal detection");
    let misses = misclassified(CLOSING_CASES, |text| classifier.is_closing_signal(text));
    all_passed &= report(
        misses.is_empty(),
        &describe(CLOSING_CASES.len(), &misses),
    );

    step("[5/5] Identity-challenge detection");
    let misses = misclassified(IDENTITY_CASES, |text| classifier.is_identity_challenge(text));
    all_passed &= report(
        misses.is_empty(),
        &describe(IDENTITY_CASES.len(), &misses),
    );

    all_passed
}

fn misclassified<'a>(cases: &[(&'a str, bool)], predicate: impl Fn(&str) -> bool) -> Vec<&'a str> {
    cases
        .iter()
        .filter(|(text, expected)| predicate(text) != *expected)
        .map(|(text, _)| *text)
        .collect()
}

fn describe(total: usize, misses: &[&str]) -> String {
    if misses.is_empty() {
        format!("{total} cases")
    } else {
        format!("misclassified: {}", misses.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn step_label_is_flushed() {
        let mut out = Vec::new();
        write_step(&mut out, "[1/5] Backend connectivity").unwrap();
        assert_eq!(out, b"[1/5] Backend connectivity... ");
    }

    #[test]
    fn flush_failure_is_reported() {
        let err = write_step(&mut BrokenPipe, "[2/5] Configuration").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn misclassified_lists_only_wrong_answers() {
        let misses = misclassified(CLOSING_CASES, |text| text == "Hello");
        assert!(misses.contains(&"Goodbye"));
        assert!(misses.contains(&"Hello"));
        assert!(!misses.contains(&"Yes, I can pay tomorrow"));
        assert_eq!(describe(5, &[]), "5 cases");
    }
}
