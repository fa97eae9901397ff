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

//! Configuration loading for relance.
//!
//! The configuration is a single JSON document read once at startup. Every
//! client record is validated while loading, so a broken profile stops the
//! process before any conversation starts.

mod error;
mod schema;

pub use error::ConfigError;
pub use schema::{
    API_KEY_ENV, API_KEY_PLACEHOLDER, CONFIG_PATH_ENV, ClientRecord, Config, GeminiConfig,
    HarnessConfig, ProvidersConfig, SpeechConfig,
};
