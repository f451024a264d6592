use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::mutation::Mutation;
use wedplan_google::GeminiClient;

use super::{commit, open_session};
use crate::utils::tui::create_spinner;

fn client(config: &WedplanConfig) -> Result<GeminiClient> {
    let api_key = config.google.gemini_api_key.as_deref().context(
        "No Gemini API key configured. Set WEDPLAN__GOOGLE__GEMINI_API_KEY \
         or google.gemini_api_key in the config file",
    )?;
    Ok(GeminiClient::new(api_key, &config.google.gemini_model))
}

pub async fn run(config: &WedplanConfig, add: bool) -> Result<()> {
    let gemini = client(config)?;
    let session = open_session(config).await?;
    let document = session.document();

    let spinner = create_spinner("Asking for suggestions");
    let suggestions = gemini.suggest(&document.tasks, &document.wedding_theme).await;
    spinner.finish_and_clear();

    let suggestions = match suggestions {
        Ok(suggestions) => suggestions,
        Err(e) => {
            session.shutdown().await?;
            return Err(e.into());
        }
    };

    if suggestions.is_empty() {
        println!("{}", "No suggestions this time".dimmed());
        session.shutdown().await?;
        return Ok(());
    }

    for suggestion in &suggestions {
        println!(
            "✨ {} {}\n   {}",
            suggestion.title.bold(),
            suggestion.category.dimmed(),
            suggestion.reason
        );
    }

    if add {
        let count = suggestions.len();
        commit(
            session,
            suggestions
                .into_iter()
                .map(|s| Mutation::AddTask(s.into_task())),
        )
        .await?;
        println!("{} {count} tasks", "Added".green());
    } else {
        session.shutdown().await?;
    }

    Ok(())
}

pub async fn vows_help(config: &WedplanConfig, tone: &str, apply: bool) -> Result<()> {
    let gemini = client(config)?;
    let session = open_session(config).await?;
    let current = session.document().vows;

    let spinner = create_spinner("Writing");
    let vows = gemini.help_with_vows(&current, tone).await;
    spinner.finish_and_clear();

    let vows = match vows {
        Ok(vows) => vows,
        Err(e) => {
            session.shutdown().await?;
            return Err(e.into());
        }
    };

    println!("{vows}");

    if apply {
        commit(session, [Mutation::SetVows(vows)]).await?;
        println!("\n{}", "Vows saved".green());
    } else {
        session.shutdown().await?;
    }

    Ok(())
}
