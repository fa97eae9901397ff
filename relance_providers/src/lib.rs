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

//! External service clients: text generation and speech rendering.

mod gemini;
mod retry;
pub mod speech;

pub use gemini::GeminiProvider;
pub use retry::{RetryPolicy, retry_with_backoff_when};
pub use speech::{CachedSynthesizer, GoogleTranslateTts, SpeechSynthesizer};
