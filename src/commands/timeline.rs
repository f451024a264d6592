use anyhow::Result;
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::model::TimelineItem;
use wedplan_core::mutation::Mutation;

use super::{commit, open_session, read_document, resolve_id};
use crate::args::TimelineCommand;
use crate::render::Render;

pub async fn run(config: &WedplanConfig, command: TimelineCommand) -> Result<()> {
    match command {
        TimelineCommand::Add {
            time,
            activity,
            location,
            notes,
        } => {
            let mut item = TimelineItem::new(&time, &activity);
            item.location = location.unwrap_or_default();
            item.notes = notes.unwrap_or_default();

            let session = open_session(config).await?;
            let document = commit(session, [Mutation::AddTimelineItem(item)]).await?;
            print_timeline(&document.timeline);
        }

        TimelineCommand::List => {
            let document = read_document(config).await?;
            print_timeline(&document.timeline);
        }

        TimelineCommand::Rm { id } => {
            let session = open_session(config).await?;
            let id = resolve_id(&session.document().timeline, |i| i.id.as_str(), &id, "timeline item")?;
            let document = commit(session, [Mutation::DeleteTimelineItem(id)]).await?;
            print_timeline(&document.timeline);
        }
    }

    Ok(())
}

fn print_timeline(items: &[TimelineItem]) {
    if items.is_empty() {
        println!("{}", "Nothing scheduled yet".dimmed());
    }
    for item in items {
        println!("{}", item.render());
    }
}
