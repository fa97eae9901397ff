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

//! Per-conversation orchestration.
//!
//! A [`SessionOrchestrator`] owns one conversation with one client profile:
//! it greets, classifies each user utterance, builds the backend prompt from
//! a bounded window of recent turns, and turns backend failures into an
//! in-character apology.
//!
//! # Key Features
//! - Append-only turn history
//! - Identity challenges answered without a backend call
//! - Configurable history window
//! - Bounded backend round-trip

mod history;
mod orchestrator;
mod session;

pub use history::{HistoryStats, HistoryWindow};
pub use orchestrator::{Reply, ReplyKind, SessionOrchestrator, SessionState};
pub use session::ConversationSession;
