//! Day-of schedule.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TIMELINE_TIME;
use crate::error::{WeddingError, WeddingResult};
use crate::id::new_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub id: String,
    /// `HH:MM`; the sort key of the timeline.
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

fn default_time() -> String {
    DEFAULT_TIMELINE_TIME.to_string()
}

impl TimelineItem {
    pub fn new(time: &str, activity: &str) -> Self {
        TimelineItem {
            id: new_id(),
            time: time.to_string(),
            activity: activity.to_string(),
            location: String::new(),
            notes: String::new(),
        }
    }

    pub fn blank() -> Self {
        TimelineItem::new(DEFAULT_TIMELINE_TIME, "")
    }
}

/// Canonical zero-padded `HH:MM` form of a time of day, so times sort
/// correctly as strings. Accepts `9:00` as well as `09:00`.
pub fn normalize_time(time: &str) -> WeddingResult<String> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| WeddingError::Validation(format!("'{time}' is not a time of day (HH:MM)")))
}

/// Stable sort by time of day, ascending.
pub fn sort_timeline(items: &mut [TimelineItem]) {
    items.sort_by(|a, b| a.time.cmp(&b.time));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_timeline_is_stable() {
        let mut items = vec![
            TimelineItem::new("18:00", "Cena"),
            TimelineItem::new("12:00", "Ceremonia"),
            TimelineItem::new("12:00", "Fotos"),
            TimelineItem::new("09:30", "Peluquería"),
        ];
        sort_timeline(&mut items);

        let activities: Vec<_> = items.iter().map(|i| i.activity.as_str()).collect();
        assert_eq!(activities, ["Peluquería", "Ceremonia", "Fotos", "Cena"]);
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("9:00").unwrap(), "09:00");
        assert_eq!(normalize_time("21:45").unwrap(), "21:45");
        assert!(normalize_time("24:00").is_err());
        assert!(normalize_time("").is_err());
    }
}
