//! Command-line arguments.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use wedplan_core::model::{GuestGroup, GuestSide, TaskCategory, TaskStatus};

#[derive(Parser)]
#[command(name = "wedplan")]
#[command(about = "Plan your wedding from the terminal, synced across devices")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Countdown, progress and budget at a glance
    Status,
    /// Planning checklist
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Guest list
    Guest {
        #[command(subcommand)]
        command: GuestCommand,
    },
    /// Seating plan
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },
    /// Schedule for the day itself
    Timeline {
        #[command(subcommand)]
        command: TimelineCommand,
    },
    /// Change the wedding date, theme or vows
    Set {
        #[command(subcommand)]
        command: SetCommand,
    },
    /// Budget ledger with totals
    Budget {
        #[arg(short, long, value_parser = parse_category)]
        category: Option<TaskCategory>,

        #[arg(short, long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Upload a photo of the couple
    Photo { file: PathBuf },
    /// Google Calendar export
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Ask the assistant what the plan is missing
    Suggest {
        /// Add every suggestion as a new task
        #[arg(long)]
        add: bool,
    },
    /// Ask the assistant to draft or polish the vows
    VowsHelp {
        /// e.g. "romántico", "divertido", "emotivo"
        #[arg(short, long, default_value = "romántico")]
        tone: String,

        /// Replace the stored vows with the result
        #[arg(long)]
        apply: bool,
    },
    /// Follow changes to the wedding as they happen
    Watch,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    Add {
        title: String,

        #[arg(short, long, value_parser = parse_category)]
        category: Option<TaskCategory>,

        #[arg(short, long, value_parser = parse_amount)]
        budget: Option<f64>,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        due: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        supplier: Option<String>,
    },
    List {
        #[arg(short, long, value_parser = parse_category)]
        category: Option<TaskCategory>,

        #[arg(short, long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    Update {
        /// Task id (a unique prefix is enough)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long, value_parser = parse_category)]
        category: Option<TaskCategory>,

        #[arg(short, long, value_parser = parse_status)]
        status: Option<TaskStatus>,

        #[arg(short, long, value_parser = parse_amount)]
        budget: Option<f64>,

        /// Amount actually spent
        #[arg(long, value_parser = parse_amount)]
        cost: Option<f64>,

        /// Due date (YYYY-MM-DD); empty to clear
        #[arg(short, long, value_parser = parse_optional_date)]
        due: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        supplier: Option<String>,
    },
    /// Mark a task as completed
    Done { id: String },
    Rm {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum GuestCommand {
    Add {
        name: String,

        #[arg(short, long, value_parser = parse_group)]
        group: Option<GuestGroup>,

        #[arg(short, long, value_parser = parse_side)]
        side: Option<GuestSide>,

        #[arg(short, long)]
        confirmed: bool,

        /// Dietary restrictions
        #[arg(long)]
        diet: Option<String>,
    },
    List {
        /// Only confirmed guests without a table
        #[arg(long)]
        unseated: bool,
    },
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long, value_parser = parse_group)]
        group: Option<GuestGroup>,

        #[arg(short, long, value_parser = parse_side)]
        side: Option<GuestSide>,

        #[arg(short, long)]
        confirmed: Option<bool>,

        #[arg(long)]
        diet: Option<String>,

        /// Quick numeric table assignment, 0 to clear
        #[arg(long)]
        table_number: Option<u32>,
    },
    Rm {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TableCommand {
    Add {
        /// Defaults to "Mesa N"
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        capacity: Option<u32>,
    },
    List,
    Rm {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
    /// Seat a guest at a table, or unseat them when no table is given
    Assign { guest: String, table: Option<String> },
}

#[derive(Subcommand)]
pub enum TimelineCommand {
    Add {
        /// HH:MM
        #[arg(value_parser = parse_time)]
        time: String,

        activity: String,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },
    List,
    Rm { id: String },
}

#[derive(Subcommand)]
pub enum SetCommand {
    /// YYYY-MM-DD
    Date {
        #[arg(value_parser = parse_date)]
        date: String,
    },
    Theme { theme: String },
    Vows {
        /// New vows text
        #[arg(required_unless_present = "file")]
        text: Option<String>,

        /// Read the vows from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CalendarCommand {
    /// Create one all-day event per task with a due date
    Export {
        /// OAuth access token with the calendar.events scope
        #[arg(long, env = "WEDPLAN_GOOGLE_TOKEN", hide_env_values = true)]
        token: String,
    },
}

pub fn parse_category(s: &str) -> Result<TaskCategory, String> {
    let key = s.trim().to_lowercase();
    let category = match key.as_str() {
        "venue" => TaskCategory::Venue,
        "attire" => TaskCategory::Attire,
        "guests" => TaskCategory::Guests,
        "photo" | "photo-video" => TaskCategory::PhotoVideo,
        "decor" => TaskCategory::Decor,
        "music" => TaskCategory::Music,
        "legal" => TaskCategory::Legal,
        "other" => TaskCategory::Other,
        _ => {
            return by_label(TaskCategory::ALL, |c| c.label(), &key).ok_or_else(|| {
                format!(
                    "unknown category '{s}' (venue, attire, guests, photo, decor, music, legal, other)"
                )
            });
        }
    };
    Ok(category)
}

pub fn parse_status(s: &str) -> Result<TaskStatus, String> {
    let key = s.trim().to_lowercase();
    let status = match key.as_str() {
        "todo" => TaskStatus::Todo,
        "in-progress" | "doing" => TaskStatus::InProgress,
        "done" => TaskStatus::Done,
        "pending-payment" | "unpaid" => TaskStatus::PendingPayment,
        _ => {
            return by_label(TaskStatus::ALL, |c| c.label(), &key).ok_or_else(|| {
                format!("unknown status '{s}' (todo, in-progress, done, pending-payment)")
            });
        }
    };
    Ok(status)
}

pub fn parse_group(s: &str) -> Result<GuestGroup, String> {
    let key = s.trim().to_lowercase();
    let group = match key.as_str() {
        "family" => GuestGroup::Family,
        "friends" => GuestGroup::Friends,
        "work" => GuestGroup::Work,
        "other" => GuestGroup::Other,
        _ => {
            return by_label(GuestGroup::ALL, |g| g.label(), &key)
                .ok_or_else(|| format!("unknown group '{s}' (family, friends, work, other)"));
        }
    };
    Ok(group)
}

pub fn parse_side(s: &str) -> Result<GuestSide, String> {
    let key = s.trim().to_lowercase();
    let side = match key.as_str() {
        "bride" => GuestSide::Bride,
        "groom" => GuestSide::Groom,
        "both" => GuestSide::Both,
        _ => {
            return by_label(GuestSide::ALL, |g| g.label(), &key)
                .ok_or_else(|| format!("unknown side '{s}' (bride, groom, both)"));
        }
    };
    Ok(side)
}

/// Also accept the labels stored in the document, e.g. "Completado".
fn by_label<T: Copy>(all: &[T], label: impl Fn(&T) -> &'static str, key: &str) -> Option<T> {
    all.iter().copied().find(|v| label(v).to_lowercase() == key)
}

pub fn parse_amount(s: &str) -> Result<f64, String> {
    let amount: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err("amount must be zero or more".into());
    }
    Ok(amount)
}

pub fn parse_date(s: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("'{s}' is not a date (YYYY-MM-DD)"))
}

fn parse_optional_date(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Ok(String::new())
    } else {
        parse_date(s)
    }
}

/// Normalizes to zero-padded `HH:MM` so the timeline sorts correctly.
pub fn parse_time(s: &str) -> Result<String, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| format!("'{s}' is not a time (HH:MM)"))
}
