use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use relance_conversation::SessionOrchestrator;
use relance_core::{AgentConfig, ClientProfile, GenerativeBackend};

use crate::result::{TestResult, TurnResult, is_closing_acknowledgement};
use crate::{HarnessError, Scenario};

/// One cell of the evaluation matrix.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub scenario: Arc<Scenario>,
    pub profile: Arc<ClientProfile>,
    /// 1-based.
    pub iteration: usize,
}

impl TestCase {
    fn failed(&self, error: &HarnessError) -> TestResult {
        TestResult {
            scenario: self.scenario.name.clone(),
            category: self.scenario.category,
            client_id: self.profile.id.clone(),
            client_name: self.profile.client_name.clone(),
            iteration: self.iteration,
            greeting: None,
            turns: Vec::new(),
            success: false,
            properly_closed: false,
            total_time: Duration::ZERO,
            failure_reason: Some(error.to_string()),
        }
    }
}

/// Replays scenarios against fresh sessions, a bounded number at a time.
pub struct Harness {
    backend: Arc<dyn GenerativeBackend>,
    config: Arc<AgentConfig>,
    concurrency: usize,
}

impl Harness {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: AgentConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            concurrency: 1,
        }
    }

    /// Sessions in flight at once. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Scenario-major Cartesian product: scenario, then client, then iteration.
    #[must_use]
    pub fn plan(
        scenarios: &[Scenario],
        profiles: &[Arc<ClientProfile>],
        iterations: usize,
    ) -> Vec<TestCase> {
        let mut cases = Vec::with_capacity(scenarios.len() * profiles.len() * iterations);
        for scenario in scenarios {
            let scenario = Arc::new(scenario.clone());
            for profile in profiles {
                for iteration in 1..=iterations {
                    cases.push(TestCase {
                        scenario: Arc::clone(&scenario),
                        profile: Arc::clone(profile),
                        iteration,
                    });
                }
            }
        }
        cases
    }

    pub async fn run(&self, cases: Vec<TestCase>) -> Vec<TestResult> {
        self.run_with(cases, |_| {}).await
    }

    /// Run every case; `observer` sees each result in plan order.
    ///
    /// Returned results are in plan order regardless of completion order.
    /// A failing case never stops the others.
    pub async fn run_with<F>(&self, cases: Vec<TestCase>, mut observer: F) -> Vec<TestResult>
    where
        F: FnMut(&TestResult),
    {
        info!(
            "Running {} tests ({} in parallel)",
            cases.len(),
            self.concurrency
        );
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = cases
            .into_iter()
            .map(|case| {
                let semaphore = Arc::clone(&semaphore);
                let backend = Arc::clone(&self.backend);
                let config = Arc::clone(&self.config);
                let task_case = case.clone();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    run_case(&task_case, backend, &config).await
                });
                (case, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (case, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let error = HarnessError::Worker(e.to_string());
                    warn!(
                        "Test {} / {} #{} aborted: {error}",
                        case.scenario.name, case.profile.id, case.iteration
                    );
                    case.failed(&error)
                }
            };
            observer(&result);
            results.push(result);
        }
        results
    }
}

async fn run_case(
    case: &TestCase,
    backend: Arc<dyn GenerativeBackend>,
    config: &AgentConfig,
) -> TestResult {
    let mut agent = match SessionOrchestrator::new(backend, Arc::clone(&case.profile), config) {
        Ok(agent) => agent,
        Err(e) => {
            let error = HarnessError::from(e);
            warn!("Cannot start session for {}: {error}", case.profile.id);
            return case.failed(&error);
        }
    };

    let greeting = agent.start();
    let mut turns = Vec::with_capacity(case.scenario.utterances.len());
    for utterance in &case.scenario.utterances {
        let started = Instant::now();
        let reply = agent.respond(utterance).await;
        let latency = started.elapsed();
        debug!(
            "[{} / {}] {:?} reply in {:.2?}",
            case.scenario.name, case.profile.id, reply.kind, latency
        );
        turns.push(TurnResult::new(utterance.as_str(), reply, latency));
    }

    let last_agent_text = turns
        .last()
        .map_or(greeting.text.as_str(), |t| t.agent_text.as_str());
    let properly_closed = is_closing_acknowledgement(last_agent_text);
    let total_time = turns.iter().map(|t| t.latency).sum();

    TestResult {
        scenario: case.scenario.name.clone(),
        category: case.scenario.category,
        client_id: case.profile.id.clone(),
        client_name: case.profile.client_name.clone(),
        iteration: case.iteration,
        greeting: Some(greeting.text),
        turns,
        success: true,
        properly_closed,
        total_time,
        failure_reason: None,
    }
}
