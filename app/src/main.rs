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

mod command;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use command::{
    ChatInput, ChatStrategy, CheckStrategy, ClientsStrategy, CommandStrategy, EvaluateInput,
    EvaluateStrategy, InitStrategy, SpeakInput, SpeakStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "relance")]
#[command(about = "Client-customized collections agent and its evaluation harness", long_about = None)]
struct Cli {
    /// Configuration file (default: $RELANCE_CONFIG or ~/relance/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured clients
    Clients,
    /// Talk to the agent as one client
    Chat {
        /// Client id (default: first configured client)
        #[arg(long)]
        client: Option<String>,

        /// Start without the pre-flight self-test
        #[arg(long)]
        skip_check: bool,

        /// Render every agent reply to an audio file
        #[arg(long)]
        voice: bool,
    },
    /// Replay scripted scenarios and write a report
    Evaluate {
        /// Restrict to one client
        #[arg(long)]
        client: Option<String>,

        /// Runs per scenario and client
        #[arg(short, long, default_value_t = 1)]
        iterations: usize,

        /// Report path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sessions evaluated in parallel (default from config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// JSON file with custom scenarios
        #[arg(long)]
        scenarios: Option<PathBuf>,

        /// Print every exchange
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run the pre-flight self-test
    Check,
    /// Render text to a cached audio file
    Speak {
        text: String,

        /// Language code (default from config)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Clients => ClientsStrategy.execute(config_path).await,
        Commands::Chat {
            client,
            skip_check,
            voice,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    config_path,
                    client,
                    skip_check,
                    voice,
                })
                .await
        }
        Commands::Evaluate {
            client,
            iterations,
            output,
            concurrency,
            scenarios,
            verbose,
        } => {
            EvaluateStrategy
                .execute(EvaluateInput {
                    config_path,
                    client,
                    iterations,
                    output,
                    concurrency,
                    scenarios,
                    verbose,
                })
                .await
        }
        Commands::Check => CheckStrategy.execute(config_path).await,
        Commands::Speak { text, language } => {
            SpeakStrategy
                .execute(SpeakInput {
                    config_path,
                    text,
                    language,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(config_path).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
