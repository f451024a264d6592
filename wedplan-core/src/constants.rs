//! Shared defaults.

use std::time::Duration;

/// Quiet period after the last local edit before the document is saved.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Fixed key of the single wedding document.
pub const DEFAULT_DOCUMENT_ID: &str = "default-wedding";

/// Remote collection holding wedding documents.
pub const DEFAULT_COLLECTION: &str = "weddings";

pub const DEFAULT_WEDDING_DATE: &str = "2025-06-21";
pub const DEFAULT_WEDDING_THEME: &str = "Jardín Romántico Moderno";

pub const DEFAULT_TASK_COLOR: &str = "#f3f4f6";
pub const DEFAULT_TASK_ICON: &str = "✨";
pub const DEFAULT_TABLE_CAPACITY: u32 = 10;
pub const DEFAULT_TIMELINE_TIME: &str = "12:00";

/// Glyphs offered when picking a task icon.
pub const WEDDING_ICONS: &[&str] = &[
    "💍", "👗", "👔", "🎂", "🥂", "📸", "💐", "🎵", "💌", "📍", "💒", "🚗", "🎁", "🍽️", "✨", "🗓️",
];

/// Prefix of calendar event summaries created from tasks.
pub const CALENDAR_SUMMARY_PREFIX: &str = "💍 Boda:";
