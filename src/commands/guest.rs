use anyhow::Result;
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::model::Guest;
use wedplan_core::mutation::{GuestPatch, Mutation};
use wedplan_core::stats;

use super::{commit, confirm, open_session, read_document, resolve_id};
use crate::args::GuestCommand;
use crate::render::render_guest;

pub async fn run(config: &WedplanConfig, command: GuestCommand) -> Result<()> {
    match command {
        GuestCommand::Add {
            name,
            group,
            side,
            confirmed,
            diet,
        } => {
            let mut guest = Guest::new(&name);
            if let Some(group) = group {
                guest.group = group;
            }
            if let Some(side) = side {
                guest.side = side;
            }
            guest.confirmed = confirmed;
            guest.dietary_notes = diet.unwrap_or_default();

            let session = open_session(config).await?;
            let document = commit(session, [Mutation::AddGuest(guest.clone())]).await?;
            println!("{} {}", "Added".green(), render_guest(&guest, &document));
        }

        GuestCommand::List { unseated } => {
            let document = read_document(config).await?;
            let guests: Vec<&Guest> = if unseated {
                stats::unseated_confirmed(&document.guests)
            } else {
                document.guests.iter().collect()
            };

            if guests.is_empty() {
                println!("{}", "No guests".dimmed());
            }
            for guest in &guests {
                println!("{}", render_guest(guest, &document));
            }
            println!(
                "{}",
                format!(
                    "{} guests, {} confirmed",
                    document.guests.len(),
                    stats::confirmed_count(&document.guests)
                )
                .dimmed()
            );
        }

        GuestCommand::Update {
            id,
            name,
            group,
            side,
            confirmed,
            diet,
            table_number,
        } => {
            let patch = GuestPatch {
                name,
                group,
                side,
                confirmed,
                dietary_notes: diet,
                table_number: table_number.map(|n| (n > 0).then_some(n)),
                ..Default::default()
            };
            if patch == GuestPatch::default() {
                anyhow::bail!("Nothing to update");
            }

            let session = open_session(config).await?;
            let id = resolve_id(&session.document().guests, |g| g.id.as_str(), &id, "guest")?;
            let document = commit(session, [Mutation::UpdateGuest(id.clone(), patch)]).await?;
            if let Some(guest) = document.guest(&id) {
                println!("{} {}", "Updated".green(), render_guest(guest, &document));
            }
        }

        GuestCommand::Rm { id, yes } => {
            let session = open_session(config).await?;
            let document = session.document();
            let id = resolve_id(&document.guests, |g| g.id.as_str(), &id, "guest")?;
            let name = document.guest(&id).map(|g| g.name.clone()).unwrap_or_default();

            if !confirm(&format!("Remove {name} from the guest list?"), yes)? {
                session.shutdown().await?;
                return Ok(());
            }
            commit(session, [Mutation::DeleteGuest(id)]).await?;
            println!("{} {name}", "Removed".red());
        }
    }

    Ok(())
}
