use std::path::PathBuf;
use thiserror::Error;

use relance_core::ProfileError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at: {0}. Please run 'relance init' to create config.")]
    NotFound(PathBuf),

    #[error("config file already exists at: {0}. Please edit it directly.")]
    AlreadyExists(PathBuf),

    #[error("cannot find home directory")]
    NoHomeDir,

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("client '{client}' is missing required field `{field}`")]
    MissingField { client: String, field: &'static str },

    #[error("no clients configured")]
    NoClients,

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("missing API key: set GEMINI_API_KEY or providers.gemini.api_key")]
    MissingCredential,

    #[error(transparent)]
    Profile(#[from] ProfileError),
}
