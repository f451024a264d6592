//! Derived numbers shown on the dashboard.
//!
//! Everything here is a pure function of the document (and the clock for
//! `days_remaining`).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{Guest, Table, Task, TaskCategory, TaskStatus, WeddingDocument};

const MS_PER_DAY: f64 = 86_400_000.0;

pub fn total_budget(tasks: &[Task]) -> f64 {
    tasks.iter().map(|t| t.budget).sum()
}

pub fn spent_amount(tasks: &[Task]) -> f64 {
    tasks.iter().map(|t| t.actual_cost).sum()
}

/// Money already paid out: cost of completed tasks.
pub fn paid_amount(tasks: &[Task]) -> f64 {
    tasks
        .iter()
        .filter(|t| t.status.is_done())
        .map(|t| t.actual_cost)
        .sum()
}

pub fn pending_amount(tasks: &[Task]) -> f64 {
    tasks
        .iter()
        .filter(|t| !t.status.is_done())
        .map(|t| t.actual_cost)
        .sum()
}

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.status.is_done()).count()
}

/// Whole days left until the wedding (rounded up), never negative.
///
/// The wedding date is taken as midnight UTC of that day.
pub fn days_remaining(wedding_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let Some(target) = wedding_date.and_hms_opt(0, 0, 0) else {
        return 0;
    };
    let diff_ms = (target.and_utc() - now).num_milliseconds() as f64;
    let days = (diff_ms / MS_PER_DAY).ceil() as i64;
    days.max(0)
}

/// Like [`days_remaining`] but takes the raw document string; unparseable
/// dates count as zero days.
pub fn days_remaining_from_str(wedding_date: &str, now: DateTime<Utc>) -> i64 {
    NaiveDate::parse_from_str(wedding_date.trim(), "%Y-%m-%d")
        .map(|date| days_remaining(date, now))
        .unwrap_or(0)
}

/// Completed share of tasks as a whole percentage; 0 with no tasks.
pub fn progress_percent(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let ratio = completed_count(tasks) as f64 / tasks.len() as f64;
    (ratio * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeddingStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_budget: f64,
    pub spent_amount: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub days_remaining: i64,
    pub progress_percent: u32,
}

impl WeddingStats {
    pub fn compute(document: &WeddingDocument, now: DateTime<Utc>) -> Self {
        let tasks = &document.tasks;
        WeddingStats {
            total_tasks: tasks.len(),
            completed_tasks: completed_count(tasks),
            total_budget: total_budget(tasks),
            spent_amount: spent_amount(tasks),
            paid_amount: paid_amount(tasks),
            pending_amount: pending_amount(tasks),
            days_remaining: days_remaining_from_str(&document.wedding_date, now),
            progress_percent: progress_percent(tasks),
        }
    }
}

// BUDGET VIEW:

/// Budget ledger filter; `None` means "all".
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetFilter {
    pub category: Option<TaskCategory>,
    pub status: Option<TaskStatus>,
}

impl BudgetFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.category.is_none_or(|c| task.category == c)
            && self.status.is_none_or(|s| task.status == s)
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Budget vs spend over a filtered slice of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BudgetTotals {
    pub budget: f64,
    pub spent: f64,
}

impl BudgetTotals {
    pub fn of<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(BudgetTotals::default(), |acc, t| BudgetTotals {
            budget: acc.budget + t.budget,
            spent: acc.spent + t.actual_cost,
        })
    }

    pub fn variance(&self) -> f64 {
        self.budget - self.spent
    }
}

// GUESTS & SEATING:

pub fn confirmed_count(guests: &[Guest]) -> usize {
    guests.iter().filter(|g| g.confirmed).count()
}

pub fn occupancy(table: &Table, guests: &[Guest]) -> usize {
    guests.iter().filter(|g| g.is_seated_at(&table.id)).count()
}

/// At or over capacity. Over-capacity is allowed, only surfaced.
pub fn is_full(table: &Table, guests: &[Guest]) -> bool {
    occupancy(table, guests) >= table.capacity as usize
}

pub fn is_over_capacity(table: &Table, guests: &[Guest]) -> bool {
    occupancy(table, guests) > table.capacity as usize
}

/// Confirmed guests still waiting for a seat.
pub fn unseated_confirmed(guests: &[Guest]) -> Vec<&Guest> {
    guests
        .iter()
        .filter(|g| g.confirmed && g.table_id.is_none())
        .collect()
}

// CALENDAR:

/// Scheduled tasks grouped by due date; tasks with unparseable dates are skipped.
pub fn tasks_by_due_date(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks.iter().filter(|t| t.is_scheduled()) {
        if let Ok(date) = NaiveDate::parse_from_str(task.due_date.trim(), "%Y-%m-%d") {
            days.entry(date).or_default().push(task);
        }
    }
    days
}

pub fn vows_word_count(vows: &str) -> usize {
    vows.split_whitespace().count()
}
