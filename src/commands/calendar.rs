use anyhow::Result;
use owo_colors::OwoColorize;
use wedplan_core::calendar::export_tasks;
use wedplan_core::config::WedplanConfig;
use wedplan_google::GoogleCalendar;

use super::read_document;
use crate::args::CalendarCommand;
use crate::utils::tui::create_spinner;

pub async fn run(config: &WedplanConfig, command: CalendarCommand) -> Result<()> {
    match command {
        CalendarCommand::Export { token } => export(config, &token).await,
    }
}

async fn export(config: &WedplanConfig, token: &str) -> Result<()> {
    let document = read_document(config).await?;
    let calendar = GoogleCalendar::new(&config.google.calendar_id, token)?;

    let spinner = create_spinner(format!("Exporting to {}", config.google.calendar_id));
    let summary = export_tasks(&calendar, &document.tasks).await;
    spinner.finish_and_clear();

    if summary.total == 0 {
        println!("{}", "No tasks with a due date to export".dimmed());
        return Ok(());
    }

    println!(
        "📅 {} of {} tasks exported",
        summary.success.to_string().green(),
        summary.total
    );
    if summary.failed > 0 {
        println!(
            "   {}",
            format!("{} failed, see the warnings above", summary.failed).red()
        );
    }

    Ok(())
}
