use anyhow::Result;
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::model::Table;
use wedplan_core::mutation::Mutation;

use super::{commit, confirm, open_session, read_document, resolve_id};
use crate::args::TableCommand;
use crate::render::{render_guest, render_table};

pub async fn run(config: &WedplanConfig, command: TableCommand) -> Result<()> {
    match command {
        TableCommand::Add { name, capacity } => {
            let session = open_session(config).await?;

            let mut table = Table::numbered(session.document().tables.len() + 1);
            if let Some(name) = name {
                table.name = name;
            }
            if let Some(capacity) = capacity {
                table.capacity = capacity;
            }

            let document = commit(session, [Mutation::AddTable(table.clone())]).await?;
            println!("{} {}", "Added".green(), render_table(&table, &document.guests));
        }

        TableCommand::List => {
            let document = read_document(config).await?;
            if document.tables.is_empty() {
                println!("{}", "No tables".dimmed());
            }
            for table in &document.tables {
                println!("{}", render_table(table, &document.guests));
                for guest in document.guests_at(&table.id) {
                    println!("   {}", render_guest(guest, &document));
                }
            }
        }

        TableCommand::Rm { id, yes } => {
            let session = open_session(config).await?;
            let document = session.document();
            let id = resolve_id(&document.tables, |t| t.id.as_str(), &id, "table")?;
            let seated = document.guests_at(&id).count();
            let name = document.table(&id).map(|t| t.name.clone()).unwrap_or_default();

            let prompt = if seated > 0 {
                format!("Delete {name}? {seated} guests will be left without a table")
            } else {
                format!("Delete {name}?")
            };
            if !confirm(&prompt, yes)? {
                session.shutdown().await?;
                return Ok(());
            }
            commit(session, [Mutation::DeleteTable(id)]).await?;
            println!("{} {name}", "Deleted".red());
        }

        TableCommand::Assign { guest, table } => {
            let session = open_session(config).await?;
            let document = session.document();
            let guest_id = resolve_id(&document.guests, |g| g.id.as_str(), &guest, "guest")?;
            let table_id = table
                .map(|query| resolve_id(&document.tables, |t| t.id.as_str(), &query, "table"))
                .transpose()?;

            let document = commit(
                session,
                [Mutation::AssignSeat {
                    guest_id: guest_id.clone(),
                    table_id: table_id.clone(),
                }],
            )
            .await?;

            if let Some(guest) = document.guest(&guest_id) {
                println!("{}", render_guest(guest, &document));
            }
            if let Some(table) = table_id.as_deref().and_then(|id| document.table(id)) {
                println!("{}", render_table(table, &document.guests));
            }
        }
    }

    Ok(())
}
