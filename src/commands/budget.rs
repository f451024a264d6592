use anyhow::Result;
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::model::{TaskCategory, TaskStatus};
use wedplan_core::stats::{self, BudgetFilter, BudgetTotals};

use super::read_document;
use crate::render::{Render, money};

pub async fn run(
    config: &WedplanConfig,
    category: Option<TaskCategory>,
    status: Option<TaskStatus>,
) -> Result<()> {
    let document = read_document(config).await?;
    let filter = BudgetFilter { category, status };
    let tasks = filter.apply(&document.tasks);

    if tasks.is_empty() {
        println!("{}", "No matching tasks".dimmed());
        return Ok(());
    }

    for task in &tasks {
        let variance = task.variance();
        let variance = if variance < 0.0 {
            money(variance).red().to_string()
        } else {
            money(variance).green().to_string()
        };
        println!(
            "{} {} {} · est. {} · real {} · {variance}",
            task.icon,
            task.title.bold(),
            task.status.render(),
            money(task.budget),
            money(task.actual_cost),
        );
    }

    let totals = BudgetTotals::of(tasks.iter().copied());
    println!();
    println!(
        "Total: est. {} · real {} · remaining {}",
        money(totals.budget).bold(),
        money(totals.spent).bold(),
        money(totals.variance()).bold()
    );

    if category.is_none() && status.is_none() {
        println!(
            "{}",
            format!(
                "Paid {} · pending {}",
                money(stats::paid_amount(&document.tasks)),
                money(stats::pending_amount(&document.tasks))
            )
            .dimmed()
        );
    }

    Ok(())
}
