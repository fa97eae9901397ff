//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, so dispatch
//! is resolved at compile time.

use anyhow::Context;
use relance_config::Config;
use relance_core::{ClientProfile, GenerativeBackend, ProfileStore};
use relance_providers::GeminiProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod chat;
mod check;
mod clients;
mod evaluate;
mod init;
mod speak;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use check::CheckStrategy;
pub use clients::ClientsStrategy;
pub use evaluate::{EvaluateInput, EvaluateStrategy};
pub use init::InitStrategy;
pub use speak::{SpeakInput, SpeakStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Validated configuration plus the profiles built from it.
struct AppContext {
    config: Config,
    profiles: Arc<ProfileStore>,
}

impl AppContext {
    fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = Config::resolve_path(explicit)?;
        let config = Config::load(&path)
            .with_context(|| format!("cannot load configuration from {}", path.display()))?;
        let profiles = Arc::new(config.profile_store()?);
        Ok(Self { config, profiles })
    }

    /// Fails when no API key is configured.
    fn backend(&self) -> anyhow::Result<Arc<dyn GenerativeBackend>> {
        let api_key = self.config.api_key()?;
        let provider = GeminiProvider::new(
            api_key,
            self.config.agent.model.clone(),
            self.config.agent.request_timeout(),
        )?
        .with_base_url(self.config.providers.gemini.base_url.clone());
        info!("Using model {}", self.config.agent.model);
        Ok(Arc::new(provider))
    }

    /// One client by id, or every client in id order.
    fn select_profiles(&self, client: Option<&str>) -> anyhow::Result<Vec<Arc<ClientProfile>>> {
        match client {
            Some(id) => Ok(vec![self.profiles.require(id)?]),
            None => Ok(self.profiles.iter().cloned().collect()),
        }
    }
}
