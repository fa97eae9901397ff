use relance_providers::{CachedSynthesizer, GoogleTranslateTts};
use std::path::PathBuf;

use super::AppContext;

/// Input parameters for the Speak command strategy.
#[derive(Debug, Clone)]
pub struct SpeakInput {
    pub config_path: Option<PathBuf>,
    pub text: String,
    /// Overrides `speech.language`
    pub language: Option<String>,
}

/// Strategy for rendering one utterance to the audio cache.
#[derive(Debug, Clone, Copy)]
pub struct SpeakStrategy;

impl super::CommandStrategy for SpeakStrategy {
    type Input = SpeakInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let ctx = AppContext::load(input.config_path.as_deref())?;
        let language = input
            .language
            .unwrap_or_else(|| ctx.config.speech.language.clone());

        let synthesizer = CachedSynthesizer::new(
            GoogleTranslateTts::new(ctx.config.agent.request_timeout()),
            ctx.config.speech.cache_dir.clone(),
        );

        match synthesizer.synthesize_to_file(&input.text, &language).await {
            Some(path) => {
                println!("{}", path.display());
                Ok(())
            }
            None => anyhow::bail!("speech synthesis failed; see the log for details"),
        }
    }
}
