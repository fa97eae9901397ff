use std::path::PathBuf;

use super::AppContext;

/// Strategy for listing configured clients.
#[derive(Debug, Clone, Copy)]
pub struct ClientsStrategy;

impl super::CommandStrategy for ClientsStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let ctx = AppContext::load(input.as_deref())?;

        println!("=== Available Clients ===\n");
        for (n, profile) in ctx.profiles.iter().enumerate() {
            println!("{}. {:20} - {}", n + 1, profile.id, profile.client_name);
            println!(
                "   Tone: {:15} | Formality: {}",
                profile.tone.as_str(),
                profile.formality_level
            );
        }
        println!();
        Ok(())
    }
}
