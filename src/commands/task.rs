use anyhow::Result;
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::model::{Task, TaskStatus};
use wedplan_core::mutation::{Mutation, TaskPatch};
use wedplan_core::stats::BudgetFilter;

use super::{commit, confirm, open_session, read_document, resolve_id};
use crate::args::TaskCommand;
use crate::render::Render;

pub async fn run(config: &WedplanConfig, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add {
            title,
            category,
            budget,
            due,
            notes,
            icon,
            supplier,
        } => {
            let mut task = Task::titled(&title);
            if let Some(category) = category {
                task.category = category;
            }
            task.budget = budget.unwrap_or_default();
            task.due_date = due.unwrap_or_default();
            task.notes = notes.unwrap_or_default();
            if let Some(icon) = icon {
                task.icon = icon;
            }
            if supplier.is_some() {
                task.supplier = supplier;
            }

            let session = open_session(config).await?;
            let line = task.render();
            commit(session, [Mutation::AddTask(task)]).await?;
            println!("{} {line}", "Added".green());
        }

        TaskCommand::List { category, status } => {
            let document = read_document(config).await?;
            let filter = BudgetFilter { category, status };
            let tasks = filter.apply(&document.tasks);

            if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            }
            for task in tasks {
                println!("{}", task.render());
            }
        }

        TaskCommand::Update {
            id,
            title,
            category,
            status,
            budget,
            cost,
            due,
            notes,
            icon,
            supplier,
        } => {
            let patch = TaskPatch {
                title,
                category,
                status,
                budget,
                actual_cost: cost,
                due_date: due,
                notes,
                icon,
                supplier: supplier.map(Some),
                ..Default::default()
            };
            if patch == TaskPatch::default() {
                anyhow::bail!("Nothing to update");
            }
            update(config, &id, patch).await?;
        }

        TaskCommand::Done { id } => {
            let patch = TaskPatch {
                status: Some(TaskStatus::Done),
                ..Default::default()
            };
            update(config, &id, patch).await?;
        }

        TaskCommand::Rm { id, yes } => {
            let session = open_session(config).await?;
            let document = session.document();
            let id = resolve_id(&document.tasks, |t| t.id.as_str(), &id, "task")?;
            let title = document.task(&id).map(|t| t.title.clone()).unwrap_or_default();

            if !confirm(&format!("Delete task \"{title}\"?"), yes)? {
                session.shutdown().await?;
                return Ok(());
            }
            commit(session, [Mutation::DeleteTask(id)]).await?;
            println!("{} {title}", "Deleted".red());
        }
    }

    Ok(())
}

async fn update(config: &WedplanConfig, query: &str, patch: TaskPatch) -> Result<()> {
    let session = open_session(config).await?;
    let id = resolve_id(&session.document().tasks, |t| t.id.as_str(), query, "task")?;

    let document = commit(session, [Mutation::UpdateTask(id.clone(), patch)]).await?;
    if let Some(task) = document.task(&id) {
        println!("{} {}", "Updated".green(), task.render());
    }
    Ok(())
}
