#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Synthetic conversation replay.
//!
//! Every (scenario, client, iteration) combination gets a fresh
//! [`SessionOrchestrator`](relance_conversation::SessionOrchestrator); the
//! scripted utterances are fed in order, timed, and folded into an
//! [`AggregateReport`] that renders to Markdown.

mod analysis;
mod error;
mod report;
mod result;
mod runner;
mod scenario;

pub use analysis::{AggregateReport, ClientStats, LatencyStats};
pub use error::HarnessError;
pub use report::{render_markdown, write_report};
pub use result::{CLOSING_ACKNOWLEDGEMENTS, TestResult, TurnResult, is_closing_acknowledgement};
pub use runner::{Harness, TestCase};
pub use scenario::{Category, Scenario, builtin_scenarios, load_scenarios};
