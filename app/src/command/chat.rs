//! Interactive conversation with one client profile.

use relance_conversation::{HistoryStats, SessionOrchestrator, SessionState};
use relance_providers::{CachedSynthesizer, GoogleTranslateTts};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::AppContext;
use super::check::run_preflight;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub config_path: Option<PathBuf>,
    /// Client id; the first configured client when absent
    pub client: Option<String>,
    pub skip_check: bool,
    /// Render every agent utterance to the audio cache
    pub voice: bool,
}

/// Strategy for executing the Chat command.
///
/// Greets, then alternates user input and agent replies until the user
/// sends a closing signal, types `exit`, or closes stdin.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let ctx = AppContext::load(input.config_path.as_deref())?;
        let backend = ctx.backend()?;

        if !input.skip_check && !run_preflight(&ctx, backend.as_ref()).await {
            anyhow::bail!("pre-flight test failed; fix the issues above or pass --skip-check");
        }

        let profile = match input.client.as_deref() {
            Some(id) => ctx.profiles.require(id)?,
            None => ctx
                .profiles
                .iter()
                .next()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no clients configured"))?,
        };

        let voice = input.voice.then(|| {
            let timeout = ctx.config.agent.request_timeout();
            CachedSynthesizer::new(
                GoogleTranslateTts::new(timeout),
                ctx.config.speech.cache_dir.clone(),
            )
        });
        let language = ctx.config.speech.language.as_str();

        let mut agent = SessionOrchestrator::new(backend, profile.clone(), &ctx.config.agent)?;

        println!("{}", "=".repeat(70));
        println!("Collections agent - Client: {}", profile.client_name);
        println!(
            "Tone: {} | Formality: {}",
            profile.tone, profile.formality_level
        );
        let hints: Vec<&str> = ctx
            .config
            .agent
            .closing_words
            .iter()
            .take(4)
            .map(String::as_str)
            .collect();
        println!("Type one of these to finish: {}, ...", hints.join(", "));
        println!("{}\n", "=".repeat(70));

        let greeting = agent.start();
        println!("Agent: {}\n", greeting.text);
        if let Some(voice) = &voice {
            announce(voice.synthesize_to_file(&greeting.text, language).await);
        }

        loop {
            print!("You: ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            if line == "exit" {
                break;
            }
            if line.is_empty() {
                continue;
            }

            let reply = if agent.is_closing_signal(line) {
                agent.close()
            } else {
                agent.respond(line).await
            };
            println!("\nAgent: {}\n", reply.text);
            if let Some(voice) = &voice {
                announce(voice.synthesize_to_file(&reply.text, language).await);
            }

            if agent.state() == SessionState::Closed {
                break;
            }
        }

        let session = agent.session();
        let stats = HistoryStats::of(session.turns());
        println!("{}", "=".repeat(70));
        println!("Conversation ended.");
        println!(
            "Messages exchanged: {} ({} from you, {} from the agent)",
            stats.total_turns, stats.user_turns, stats.agent_turns
        );
        println!("Characters exchanged: {}", stats.total_characters);
        println!("{}\n", "=".repeat(70));
        info!(
            "Session {} finished with {} turns",
            session.id, stats.total_turns
        );

        Ok(())
    }
}

fn announce(path: Option<PathBuf>) {
    match path {
        Some(path) => println!("  [audio: {}]\n", path.display()),
        None => println!("  [audio unavailable]\n"),
    }
}
