//! Full harness runs against in-process backends.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use relance_conversation::ReplyKind;
use relance_core::voice::{APOLOGY, identity_denial};
use relance_core::{AgentConfig, BackendError, ClientProfile, GenerativeBackend, Tone};
use relance_harness::{
    AggregateReport, Harness, builtin_scenarios, is_closing_acknowledgement, render_markdown,
};

/// Says goodbye when the client's latest line does, otherwise acknowledges.
#[derive(Default)]
struct PoliteBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl GenerativeBackend for PoliteBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last_client_line = prompt
            .lines()
            .filter(|l| l.starts_with("Client: "))
            .last()
            .unwrap_or_default();
        if last_client_line.contains("Goodbye") {
            Ok("Goodbye, and thank you for your time.".to_string())
        } else {
            Ok("Understood, let us find a solution together.".to_string())
        }
    }

    fn model(&self) -> &str {
        "polite"
    }
}

struct DownBackend;

#[async_trait]
impl GenerativeBackend for DownBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        Err(BackendError::Status {
            status: 500,
            body: "internal".to_string(),
        })
    }

    fn model(&self) -> &str {
        "down"
    }
}

struct PanickingBackend;

#[async_trait]
impl GenerativeBackend for PanickingBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        panic!("backend exploded");
    }

    fn model(&self) -> &str {
        "panicking"
    }
}

fn client(id: &str, name: &str, tone: Tone) -> Arc<ClientProfile> {
    Arc::new(ClientProfile {
        id: id.to_string(),
        client_name: name.to_string(),
        tone,
        formality_level: "medium".to_string(),
        phrasing: "direct".to_string(),
        payment_label: "a card payment".to_string(),
        closing_line: format!("{name} wishes you a good day."),
    })
}

fn three_clients() -> Vec<Arc<ClientProfile>> {
    vec![
        client("amazon", "Amazon", Tone::Collaborative),
        client("dell", "Dell Technologies", Tone::Formal),
        client("microsoft", "Microsoft", Tone::Professional),
    ]
}

fn harness(backend: Arc<dyn GenerativeBackend>) -> Harness {
    Harness::new(backend, AgentConfig::default()).with_concurrency(4)
}

#[tokio::test]
async fn matrix_size_is_scenarios_times_clients_times_iterations() {
    let scenarios: Vec<_> = builtin_scenarios().into_iter().take(3).collect();
    let clients = three_clients();
    let harness = harness(Arc::new(PoliteBackend::default()));

    let once = harness.run(Harness::plan(&scenarios, &clients, 1)).await;
    assert_eq!(once.len(), 9);

    let thrice = harness.run(Harness::plan(&scenarios, &clients, 3)).await;
    assert_eq!(thrice.len(), 27);

    // scenario-major, then client, then iteration
    assert_eq!(thrice[0].scenario, scenarios[0].name);
    assert_eq!(thrice[0].client_id, "amazon");
    assert_eq!(
        thrice[..3].iter().map(|r| r.iteration).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(thrice[3].client_id, "dell");
    assert_eq!(thrice[26].scenario, scenarios[2].name);
    assert!(thrice.iter().all(|r| r.success));
}

#[tokio::test]
async fn robot_question_is_answered_without_backend() {
    let scenarios: Vec<_> = builtin_scenarios()
        .into_iter()
        .filter(|s| s.name == "Robot Question Detection")
        .collect();
    let clients = three_clients();
    let backend = Arc::new(PoliteBackend::default());
    let harness = harness(backend.clone());

    let results = harness.run(Harness::plan(&scenarios, &clients, 1)).await;

    assert_eq!(results.len(), 3);
    for (result, profile) in results.iter().zip(&clients) {
        let second = &result.turns[1];
        assert_eq!(second.user_text, "Are you a robot?");
        assert_eq!(second.agent_text, identity_denial(profile));
        assert_eq!(second.kind, ReplyKind::IdentityDenial);
        assert!(!second.kind.called_backend());
    }
    // four of five turns per run reach the backend
    assert_eq!(backend.calls.load(Ordering::SeqCst), 12);

    let report = AggregateReport::from_results(&results);
    assert_eq!(report.identity_denials, 3);
}

#[tokio::test]
async fn hand_off_rate_counts_closing_acknowledgements_only() {
    let scenarios = builtin_scenarios();
    let clients = three_clients();
    let results = harness(Arc::new(PoliteBackend::default()))
        .run(Harness::plan(&scenarios, &clients, 1))
        .await;

    let closed = results
        .iter()
        .filter(|r| r.last_agent_text().is_some_and(is_closing_acknowledgement))
        .count();
    // "Goodbye." ends four of the six scenarios
    assert_eq!(closed, 12);

    let report = AggregateReport::from_results(&results);
    assert_eq!(report.properly_closed, closed);
    assert!((report.hand_off_rate - closed as f64 * 100.0 / 18.0).abs() < 1e-9);
    assert!(report.all_passed());
    assert!(report.latency.mean <= report.latency.p95);
    assert!(report.latency.p95 <= report.latency.max);
}

#[tokio::test]
async fn outage_keeps_success_but_surfaces_fallbacks() {
    let scenarios: Vec<_> = builtin_scenarios().into_iter().take(1).collect();
    let clients = three_clients();
    let results = harness(Arc::new(DownBackend))
        .run(Harness::plan(&scenarios, &clients, 1))
        .await;

    assert!(results.iter().all(|r| r.success));
    assert!(
        results
            .iter()
            .flat_map(|r| &r.turns)
            .all(|t| t.agent_text == APOLOGY && !t.success)
    );

    let report = AggregateReport::from_results(&results);
    assert!((report.success_rate - 100.0).abs() < f64::EPSILON);
    assert_eq!(report.fallback_replies, 15);
    assert_eq!(report.hand_off_rate, 0.0);
    let errors = &report.fallback_errors["Client Agrees to Pay"];
    assert_eq!(errors.len(), 15);
    assert!(errors[0].contains("500"));

    let markdown = render_markdown(&report, chrono::Local::now());
    assert!(markdown.contains("## Backend Errors Behind Fallback Replies"));
}

#[tokio::test]
async fn broken_profile_fails_alone() {
    let scenarios: Vec<_> = builtin_scenarios().into_iter().take(1).collect();
    let mut broken = (*client("acme", "Acme", Tone::Default)).clone();
    broken.closing_line = "  ".to_string();
    let clients = vec![Arc::new(broken), client("dell", "Dell", Tone::Formal)];

    let results = harness(Arc::new(PoliteBackend::default()))
        .run(Harness::plan(&scenarios, &clients, 1))
        .await;

    assert!(!results[0].success);
    assert!(results[0].turns.is_empty());
    assert!(
        results[0]
            .failure_reason
            .as_deref()
            .unwrap()
            .starts_with("API Error: ")
    );
    assert!(results[1].success);

    let report = AggregateReport::from_results(&results);
    assert_eq!(report.per_client["acme"].passed, 0);
    assert_eq!(report.per_client["dell"].passed, 1);
    assert_eq!(report.failures_by_scenario["Client Agrees to Pay"].len(), 1);
}

#[tokio::test]
async fn panicking_worker_is_recorded_and_run_continues() {
    let scenarios: Vec<_> = builtin_scenarios().into_iter().take(2).collect();
    let clients = vec![client("dell", "Dell", Tone::Formal)];
    let mut seen = 0;

    let results = harness(Arc::new(PanickingBackend))
        .run_with(Harness::plan(&scenarios, &clients, 1), |_| seen += 1)
        .await;

    assert_eq!(seen, 2);
    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(!result.success);
        assert!(
            result
                .failure_reason
                .as_deref()
                .unwrap()
                .starts_with("Worker task failed")
        );
    }
}

// Worker panics are only recoverable when the built profiles unwind.
#[test]
fn build_profiles_unwind_on_panic() {
    let manifest = include_str!("../../Cargo.toml");
    assert!(
        !manifest
            .lines()
            .any(|line| line.trim_start().starts_with("panic")),
        "workspace profiles must not set a panic strategy"
    );
}
