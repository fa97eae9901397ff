//! Scenario replay over the configured clients.

use relance_harness::{
    AggregateReport, Harness, TestResult, builtin_scenarios, load_scenarios, write_report,
};
use std::path::PathBuf;

use super::AppContext;

/// Input parameters for the Evaluate command strategy.
#[derive(Debug, Clone)]
pub struct EvaluateInput {
    pub config_path: Option<PathBuf>,
    /// Restrict to one client id
    pub client: Option<String>,
    pub iterations: usize,
    /// Overrides `harness.report_path`
    pub output: Option<PathBuf>,
    /// Overrides `harness.concurrency`
    pub concurrency: Option<usize>,
    /// Custom scenario file instead of the built-in suite
    pub scenarios: Option<PathBuf>,
    pub verbose: bool,
}

/// Strategy for running the evaluation harness.
///
/// Fails (non-zero exit) unless every test passed.
#[derive(Debug, Clone, Copy)]
pub struct EvaluateStrategy;

impl super::CommandStrategy for EvaluateStrategy {
    type Input = EvaluateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        if input.iterations == 0 {
            anyhow::bail!("--iterations must be at least 1");
        }

        let ctx = AppContext::load(input.config_path.as_deref())?;
        let profiles = ctx.select_profiles(input.client.as_deref())?;
        let backend = ctx.backend()?;

        let scenarios = match &input.scenarios {
            Some(path) => load_scenarios(path).await?,
            None => builtin_scenarios(),
        };
        let concurrency = input
            .concurrency
            .unwrap_or(ctx.config.harness.concurrency);
        let output = input
            .output
            .unwrap_or_else(|| ctx.config.harness.report_path.clone());

        let cases = Harness::plan(&scenarios, &profiles, input.iterations);
        println!("{}", "=".repeat(70));
        println!(
            "RUNNING TEST HARNESS - {} tests total ({} scenarios × {} clients × {} iteration(s))",
            cases.len(),
            scenarios.len(),
            profiles.len(),
            input.iterations
        );
        println!("{}\n", "=".repeat(70));

        let harness =
            Harness::new(backend, ctx.config.agent.clone()).with_concurrency(concurrency);
        let verbose = input.verbose;
        let results = harness
            .run_with(cases, |result| print_progress(result, verbose))
            .await;

        let report = AggregateReport::from_results(&results);
        print_summary(&report);
        write_report(&output, &report).await?;
        println!("✓ Report saved to: {}\n", output.display());

        if report.all_passed() {
            Ok(())
        } else {
            anyhow::bail!(
                "success rate {:.1}% is below 100%",
                report.success_rate
            )
        }
    }
}

fn print_progress(result: &TestResult, verbose: bool) {
    let status = if result.success { "✓" } else { "✗" };
    print!(
        "  {} / {} run {}... {status}",
        result.scenario, result.client_id, result.iteration
    );
    if let Some(reason) = &result.failure_reason {
        print!(" ({reason})");
    }
    println!();

    if verbose {
        for turn in &result.turns {
            let excerpt: String = turn.agent_text.chars().take(100).collect();
            println!("    → Client: {}", turn.user_text);
            println!("    → Agent: {excerpt}...");
            println!(
                "      {:?} in {:.2}s\n",
                turn.kind,
                turn.latency.as_secs_f64()
            );
        }
    }
}

fn print_summary(report: &AggregateReport) {
    println!("\n{}", "=".repeat(70));
    println!("TEST RESULTS");
    println!("{}", "=".repeat(70));
    println!("Total Tests: {}", report.total_tests);
    println!("Passed: {}", report.passed_tests);
    println!("Success Rate: {:.1}%", report.success_rate);
    println!("Hand-off Rate: {:.1}%", report.hand_off_rate);
    println!(
        "Avg Response Time: {:.2}s",
        report.latency.mean.as_secs_f64()
    );
    println!(
        "P95 Response Time: {:.2}s",
        report.latency.p95.as_secs_f64()
    );
    println!("Fallback Replies: {}", report.fallback_replies);
    println!("Identity Denials: {}", report.identity_denials);
    println!("{}\n", "=".repeat(70));
}
