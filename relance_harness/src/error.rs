use std::path::PathBuf;
use thiserror::Error;

use relance_core::PromptError;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The orchestrator could not be built for a client.
    #[error("API Error: {0}")]
    Setup(#[from] PromptError),

    /// A test task died before producing a result.
    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario file {path}: {source}")]
    ScenarioParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}
