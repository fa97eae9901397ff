mod config;

pub use config::{AgentConfig, DEFAULT_CLOSING_WORDS};
