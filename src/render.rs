//! Terminal rendering for wedding types.
//!
//! Extension traits that add colored output to wedplan-core types using
//! owo_colors.

use owo_colors::OwoColorize;
use wedplan_core::SyncEvent;
use wedplan_core::model::{Guest, Table, Task, TaskStatus, TimelineItem, WeddingDocument};
use wedplan_core::stats::{self, WeddingStats};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Ids are long; the first few characters are enough to type.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// `[#####-----] 50%`
pub fn progress_bar(percent: u32) -> String {
    const WIDTH: usize = 20;
    let filled = (percent.min(100) as usize * WIDTH) / 100;
    format!(
        "[{}{}] {percent}%",
        "#".repeat(filled).green(),
        "-".repeat(WIDTH - filled).dimmed()
    )
}

impl Render for TaskStatus {
    fn render(&self) -> String {
        let label = self.label();
        match self {
            TaskStatus::Todo => label.dimmed().to_string(),
            TaskStatus::InProgress => label.yellow().to_string(),
            TaskStatus::Done => label.green().to_string(),
            TaskStatus::PendingPayment => label.red().to_string(),
        }
    }
}

impl Render for Task {
    fn render(&self) -> String {
        let title = if self.status.is_done() {
            self.title.strikethrough().to_string()
        } else {
            self.title.bold().to_string()
        };

        let mut line = format!(
            "{} {} {} {}",
            self.icon,
            title,
            self.status.render(),
            self.category.dimmed()
        );
        if self.is_scheduled() {
            line.push_str(&format!(" 📅 {}", self.due_date));
        }
        if self.budget > 0.0 || self.actual_cost > 0.0 {
            line.push_str(&format!(
                " {} / {}",
                money(self.actual_cost),
                money(self.budget).dimmed()
            ));
        }
        format!("{line} {}", short_id(&self.id).dimmed())
    }
}

impl Render for TimelineItem {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.time.bold(), self.activity);
        if !self.location.is_empty() {
            line.push_str(&format!(" @ {}", self.location.cyan()));
        }
        format!("{line} {}", short_id(&self.id).dimmed())
    }
}

impl Render for SyncEvent {
    fn render(&self) -> String {
        match self {
            SyncEvent::Loaded { created: true } => "New wedding document created".green().to_string(),
            SyncEvent::Loaded { created: false } => "Wedding document loaded".green().to_string(),
            SyncEvent::RemoteApplied => "Changed on another device".yellow().to_string(),
            SyncEvent::EchoSkipped => "Own save confirmed".dimmed().to_string(),
            SyncEvent::Saved { .. } => "Saved".green().to_string(),
            SyncEvent::SaveFailed(reason) => format!("Save failed: {reason}").red().to_string(),
            SyncEvent::RemoteError(reason) => format!("Store error: {reason}").red().to_string(),
        }
    }
}

/// Guest line, with the name of their table looked up in `document`.
pub fn render_guest(guest: &Guest, document: &WeddingDocument) -> String {
    let mark = if guest.confirmed {
        "✓".green().to_string()
    } else {
        "·".dimmed().to_string()
    };

    let mut line = format!(
        "{mark} {} {}",
        guest.name.bold(),
        format!("{} / {}", guest.group, guest.side).dimmed()
    );
    if !guest.dietary_notes.is_empty() {
        line.push_str(&format!(" 🍽 {}", guest.dietary_notes));
    }
    let table = guest
        .table_id
        .as_deref()
        .and_then(|id| document.table(id))
        .map(|t| t.name.clone())
        .or_else(|| guest.table_number.map(|n| format!("#{n}")));
    if let Some(table) = table {
        line.push_str(&format!(" → {}", table.cyan()));
    }
    format!("{line} {}", short_id(&guest.id).dimmed())
}

/// Table header with occupancy; yellow when full, red when over capacity.
pub fn render_table(table: &Table, guests: &[Guest]) -> String {
    let seats = format!("{}/{}", stats::occupancy(table, guests), table.capacity);
    let seats = if stats::is_over_capacity(table, guests) {
        seats.red().to_string()
    } else if stats::is_full(table, guests) {
        seats.yellow().to_string()
    } else {
        seats.green().to_string()
    };
    format!("🪑 {} {seats} {}", table.name.bold(), short_id(&table.id).dimmed())
}

pub fn render_stats(stats: &WeddingStats, document: &WeddingDocument) -> Vec<String> {
    let mut lines = vec![
        format!("💍 {} · {}", document.wedding_date.bold(), document.wedding_theme.italic()),
        format!("   {} days to go", stats.days_remaining.to_string().bold()),
        format!(
            "   Tasks: {}/{} {}",
            stats.completed_tasks,
            stats.total_tasks,
            progress_bar(stats.progress_percent)
        ),
        format!(
            "   Budget: {} · spent {} · paid {} · pending {}",
            money(stats.total_budget),
            money(stats.spent_amount),
            money(stats.paid_amount).green(),
            money(stats.pending_amount).yellow()
        ),
        format!(
            "   Guests: {} confirmed of {}",
            stats::confirmed_count(&document.guests),
            document.guests.len()
        ),
    ];

    let unseated = stats::unseated_confirmed(&document.guests).len();
    if unseated > 0 {
        lines.push(format!("   {}", format!("{unseated} confirmed guests without a table").yellow()));
    }
    if !document.vows.is_empty() {
        lines.push(format!(
            "   Vows: {} words",
            stats::vows_word_count(&document.vows)
        ));
    }
    lines
}
