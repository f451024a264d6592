mod args;
mod commands;
mod logging;
mod render;
mod utils;

use anyhow::Result;
use clap::Parser;
use wedplan_core::config::WedplanConfig;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    let config = WedplanConfig::load()?;

    match cli.command {
        Commands::Status => commands::status::run(&config).await,
        Commands::Task { command } => commands::task::run(&config, command).await,
        Commands::Guest { command } => commands::guest::run(&config, command).await,
        Commands::Table { command } => commands::table::run(&config, command).await,
        Commands::Timeline { command } => commands::timeline::run(&config, command).await,
        Commands::Set { command } => commands::set::run(&config, command).await,
        Commands::Budget { category, status } => {
            commands::budget::run(&config, category, status).await
        }
        Commands::Photo { file } => commands::photo::run(&config, &file).await,
        Commands::Calendar { command } => commands::calendar::run(&config, command).await,
        Commands::Suggest { add } => commands::suggest::run(&config, add).await,
        Commands::VowsHelp { tone, apply } => {
            commands::suggest::vows_help(&config, &tone, apply).await
        }
        Commands::Watch => commands::watch::run(&config).await,
    }
}
