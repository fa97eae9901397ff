//! Aggregation over a finished run.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::TestResult;

/// Pooled per-turn latency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub samples: usize,
    pub mean: Duration,
    /// Nearest-rank 95th percentile, never below `mean`.
    pub p95: Duration,
    pub max: Duration,
}

impl LatencyStats {
    /// All zero for an empty sample.
    #[must_use]
    pub fn of(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();

        let total: u128 = sorted.iter().map(Duration::as_nanos).sum();
        let mean_nanos = u64::try_from(total / n as u128).unwrap_or(u64::MAX);
        let mean = Duration::from_nanos(mean_nanos);

        let rank = (95 * n).div_ceil(100);
        let nearest = sorted[rank.saturating_sub(1)];
        let max = sorted[n - 1];

        Self {
            samples: n,
            mean,
            p95: nearest.max(mean).min(max),
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStats {
    pub client_name: String,
    pub total: usize,
    pub passed: usize,
}

impl ClientStats {
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        percentage(self.passed, self.total)
    }
}

/// Read-only summary of a run.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub total_tests: usize,
    pub passed_tests: usize,
    /// Percent.
    pub success_rate: f64,
    pub latency: LatencyStats,
    pub properly_closed: usize,
    /// Percent of tests whose last agent utterance acknowledged the end of the call.
    pub hand_off_rate: f64,
    /// Scenario name to one reason per failed test.
    pub failures_by_scenario: BTreeMap<String, Vec<String>>,
    pub per_client: BTreeMap<String, ClientStats>,
    pub fallback_replies: usize,
    pub identity_denials: usize,
    /// Scenario name to raw backend errors behind apology replies.
    pub fallback_errors: BTreeMap<String, Vec<String>>,
    pub example_success: Option<TestResult>,
    pub example_failure: Option<TestResult>,
}

impl AggregateReport {
    #[must_use]
    pub fn from_results(results: &[TestResult]) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.success).count();
        let properly_closed = results.iter().filter(|r| r.properly_closed).count();

        let latencies: Vec<Duration> = results
            .iter()
            .flat_map(|r| r.turns.iter().map(|t| t.latency))
            .collect();

        let mut failures_by_scenario: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut fallback_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut per_client: BTreeMap<String, ClientStats> = BTreeMap::new();

        for result in results {
            let stats = per_client
                .entry(result.client_id.clone())
                .or_insert_with(|| ClientStats {
                    client_name: result.client_name.clone(),
                    total: 0,
                    passed: 0,
                });
            stats.total += 1;
            if result.success {
                stats.passed += 1;
            } else {
                failures_by_scenario
                    .entry(result.scenario.clone())
                    .or_default()
                    .push(
                        result
                            .failure_reason
                            .clone()
                            .unwrap_or_else(|| "Unknown failure".to_string()),
                    );
            }

            for (n, turn) in result.turns.iter().enumerate() {
                if let Some(reason) = turn.failure_reason.as_ref() {
                    fallback_errors
                        .entry(result.scenario.clone())
                        .or_default()
                        .push(format!(
                            "{} #{} turn {}: {reason}",
                            result.client_id,
                            result.iteration,
                            n + 1
                        ));
                }
            }
        }

        Self {
            total_tests,
            passed_tests,
            success_rate: percentage(passed_tests, total_tests),
            latency: LatencyStats::of(&latencies),
            properly_closed,
            hand_off_rate: percentage(properly_closed, total_tests),
            failures_by_scenario,
            per_client,
            fallback_replies: results.iter().map(TestResult::fallback_count).sum(),
            identity_denials: results.iter().map(TestResult::denial_count).sum(),
            fallback_errors,
            example_success: results.iter().find(|r| r.success).cloned(),
            example_failure: results.iter().find(|r| !r.success).cloned(),
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.total_tests > 0 && self.passed_tests == self.total_tests
    }

    /// Scenarios by descending failure count.
    #[must_use]
    pub fn failure_modes(&self) -> Vec<(&str, &[String])> {
        let mut modes: Vec<_> = self
            .failures_by_scenario
            .iter()
            .map(|(name, reasons)| (name.as_str(), reasons.as_slice()))
            .collect();
        modes.sort_by_key(|(_, reasons)| Reverse(reasons.len()));
        modes
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
