use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::mutation::Mutation;
use wedplan_core::stats;

use super::{commit, open_session};
use crate::args::SetCommand;

pub async fn run(config: &WedplanConfig, command: SetCommand) -> Result<()> {
    let mutation = match command {
        SetCommand::Date { date } => Mutation::SetWeddingDate(date),
        SetCommand::Theme { theme } => Mutation::SetWeddingTheme(theme),
        SetCommand::Vows { text, file } => {
            let vows = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("Give the vows text or --file"),
            };
            Mutation::SetVows(vows.trim().to_string())
        }
    };

    let session = open_session(config).await?;
    let document = commit(session, [mutation]).await?;

    println!(
        "{} 💍 {} · {} · vows: {} words",
        "Saved".green(),
        document.wedding_date.bold(),
        document.wedding_theme.italic(),
        stats::vows_word_count(&document.vows)
    );
    Ok(())
}
