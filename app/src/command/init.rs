use relance_config::Config;
use std::path::PathBuf;

/// Strategy for initializing the configuration.
///
/// Writes the starter configuration (three example clients) to the resolved
/// config path. An existing file is never overwritten.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let path = Config::resolve_path(input.as_deref())?;
        Config::create_config(&path)?;
        println!("Configuration written to {}", path.display());
        println!("Set GEMINI_API_KEY or fill providers.gemini.api_key before chatting.");
        Ok(())
    }
}
