//! Markdown rendering of an [`AggregateReport`].

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::{AggregateReport, HarnessError, TestResult};

const TRANSCRIPT_TURNS: usize = 5;
const EXCERPT_CHARS: usize = 100;

const METHODOLOGY: &str = "\
## Methodology

Every scenario is replayed against every selected client, once per iteration, \
each time in a fresh session that starts with the client's greeting.

- A test **passes** when the session could be created and every scripted turn \
completed without a harness-level error.
- A backend failure inside a turn is answered with the apology reply; it does \
not fail the test but is counted under *Fallback replies* and listed below.
- **Hand-off rate** is the share of tests whose final agent utterance \
acknowledges the end of the call, independent of the pass/fail result.
- Latency is measured per scripted turn. P95 uses the nearest-rank method over \
all turns of the run.
";

fn secs(d: std::time::Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{cut}...")
    }
}

fn write_transcript(out: &mut String, result: &TestResult) {
    out.push_str("```\n");
    if let Some(greeting) = &result.greeting {
        let _ = writeln!(out, "Agent: {}\n", excerpt(greeting));
    }
    for turn in result.turns.iter().take(TRANSCRIPT_TURNS) {
        let _ = writeln!(out, "Client: {}", turn.user_text);
        let _ = writeln!(out, "Agent: {}\n", excerpt(&turn.agent_text));
    }
    out.push_str("```\n\n");
}

/// Render the report. Pure formatting; nothing is recomputed.
#[must_use]
pub fn render_markdown(report: &AggregateReport, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# Relance Agent - Test Report\n\n\
         **Generated:** {}\n\n\
         ## Executive Summary\n\n\
         | Metric | Value |\n\
         |--------|-------|\n\
         | Total Tests | {} |\n\
         | Passed | {} |\n\
         | **Success Rate** | **{:.1}%** |\n\
         | Hand-off Rate | {:.1}% |\n\
         | Avg Response Time | {} |\n\
         | P95 Response Time | {} |\n\
         | Max Response Time | {} |\n\
         | Fallback Replies | {} |\n\
         | Identity Denials | {} |\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        report.total_tests,
        report.passed_tests,
        report.success_rate,
        report.hand_off_rate,
        secs(report.latency.mean),
        secs(report.latency.p95),
        secs(report.latency.max),
        report.fallback_replies,
        report.identity_denials,
    );

    out.push_str("## Results by Client\n\n");
    for (id, stats) in &report.per_client {
        let _ = write!(
            out,
            "### {} ({id})\n- **Tests Run:** {}\n- **Passed:** {}\n- **Success Rate:** {:.1}%\n\n",
            stats.client_name,
            stats.total,
            stats.passed,
            stats.success_rate()
        );
    }

    out.push_str("## Notable Failure Modes\n\n");
    let modes = report.failure_modes();
    if modes.is_empty() {
        out.push_str("✓ None - All tests passed!\n\n");
    } else {
        for (scenario, reasons) in modes {
            let _ = write!(
                out,
                "### {scenario}\n**Failures:** {}\n\n**Reasons:**\n",
                reasons.len()
            );
            for (i, reason) in reasons.iter().enumerate() {
                let _ = writeln!(out, "{}. {reason}", i + 1);
            }
            out.push('\n');
        }
    }

    if !report.fallback_errors.is_empty() {
        out.push_str("## Backend Errors Behind Fallback Replies\n\n");
        for (scenario, errors) in &report.fallback_errors {
            let _ = writeln!(out, "### {scenario}");
            for error in errors {
                let _ = writeln!(out, "- {error}");
            }
            out.push('\n');
        }
    }

    out.push_str("## Example Test Transcripts\n\n");
    if let Some(success) = &report.example_success {
        let _ = write!(
            out,
            "### ✓ Successful Test: {} ({})\n\n",
            success.scenario, success.client_id
        );
        write_transcript(&mut out, success);
    }
    if let Some(failed) = &report.example_failure {
        let _ = write!(
            out,
            "### ✗ Failed Test: {} ({})\n\n**Error:** {}\n\n",
            failed.scenario,
            failed.client_id,
            failed.failure_reason.as_deref().unwrap_or("unknown")
        );
        if !failed.turns.is_empty() {
            write_transcript(&mut out, failed);
        }
    }

    out.push_str(METHODOLOGY);
    out
}

/// Render with the current local time and write to `path`.
pub async fn write_report(path: &Path, report: &AggregateReport) -> Result<String, HarnessError> {
    let markdown = render_markdown(report, Local::now());
    tokio::fs::write(path, &markdown)
        .await
        .map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Report saved to {}", path.display());
    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, TurnResult};
    use chrono::TimeZone;
    use relance_conversation::ReplyKind;
    use std::time::Duration;

    fn result(client: &str, success: bool) -> TestResult {
        TestResult {
            scenario: "Client Agrees to Pay".to_string(),
            category: Category::Positive,
            client_id: client.to_string(),
            client_name: format!("{client} Inc"),
            iteration: 1,
            greeting: Some("Hello, this is Dell.".to_string()),
            turns: vec![TurnResult {
                user_text: "Hello.".to_string(),
                agent_text: "x".repeat(150),
                kind: ReplyKind::Generated,
                latency: Duration::from_millis(1500),
                success: true,
                failure_reason: None,
            }],
            success,
            properly_closed: false,
            total_time: Duration::from_millis(1500),
            failure_reason: (!success).then(|| "API Error: missing client_name".to_string()),
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn renders_summary_and_failures() {
        let report = AggregateReport::from_results(&[result("dell", true), result("amazon", false)]);
        let markdown = render_markdown(&report, fixed_time());

        assert!(markdown.contains("**Generated:** 2024-05-01 09:30:00"));
        assert!(markdown.contains("| **Success Rate** | **50.0%** |"));
        assert!(markdown.contains("| Avg Response Time | 1.50s |"));
        assert!(markdown.contains("### dell Inc (dell)"));
        assert!(markdown.contains("1. API Error: missing client_name"));
        assert!(markdown.contains("### ✓ Successful Test: Client Agrees to Pay (dell)"));
        assert!(markdown.contains("### ✗ Failed Test: Client Agrees to Pay (amazon)"));
        assert!(markdown.contains(&format!("Agent: {}...", "x".repeat(100))));
        assert!(markdown.ends_with(METHODOLOGY));
    }

    #[test]
    fn clean_run_says_so() {
        let report = AggregateReport::from_results(&[result("dell", true)]);
        let markdown = render_markdown(&report, fixed_time());
        assert!(markdown.contains("✓ None - All tests passed!"));
        assert!(!markdown.contains("Failed Test"));
        assert!(!markdown.contains("Backend Errors"));
    }

    #[tokio::test]
    async fn write_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let report = AggregateReport::from_results(&[result("dell", true)]);

        let markdown = write_report(&path, &report).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), markdown);
    }
}
