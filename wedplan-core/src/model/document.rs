//! The single synchronized aggregate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Guest, Table, Task, TimelineItem, initial_tasks};
use crate::constants::{DEFAULT_WEDDING_DATE, DEFAULT_WEDDING_THEME};
use crate::error::{WeddingError, WeddingResult};

/// Everything the planner persists, stored as one remote document.
///
/// Missing fields in a remote document fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingDocument {
    #[serde(default = "default_date")]
    pub wedding_date: String,
    #[serde(default = "default_theme")]
    pub wedding_theme: String,
    #[serde(default)]
    pub vows: String,
    /// Download URL of the couple's picture.
    #[serde(default)]
    pub couple_image: Option<String>,
    #[serde(default = "initial_tasks")]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub guests: Vec<Guest>,
    /// Always sorted by `time`.
    #[serde(default)]
    pub timeline: Vec<TimelineItem>,
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Epoch milliseconds of the last save, stamped by the writer.
    #[serde(default)]
    pub updated_at: i64,
}

fn default_date() -> String {
    DEFAULT_WEDDING_DATE.to_string()
}

fn default_theme() -> String {
    DEFAULT_WEDDING_THEME.to_string()
}

impl Default for WeddingDocument {
    fn default() -> Self {
        WeddingDocument {
            wedding_date: default_date(),
            wedding_theme: default_theme(),
            vows: String::new(),
            couple_image: None,
            tasks: initial_tasks(),
            guests: Vec::new(),
            timeline: Vec::new(),
            tables: Vec::new(),
            updated_at: 0,
        }
    }
}

impl WeddingDocument {
    /// Parse a raw document as read from a store, applying field defaults.
    pub fn from_value(value: Value) -> WeddingResult<Self> {
        let document: WeddingDocument = serde_json::from_value(value)?;
        Ok(document.normalized())
    }

    /// Top-level fields as a JSON object, the unit of field-level merges.
    pub fn to_fields(&self) -> WeddingResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(WeddingError::Serialization(format!(
                "wedding document serialized to non-object: {other}"
            ))),
        }
    }

    /// Blank date/theme strings count as absent.
    pub fn normalized(mut self) -> Self {
        if self.wedding_date.trim().is_empty() {
            self.wedding_date = default_date();
        }
        if self.wedding_theme.trim().is_empty() {
            self.wedding_theme = default_theme();
        }
        self
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn guest(&self, id: &str) -> Option<&Guest> {
        self.guests.iter().find(|g| g.id == id)
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn timeline_item(&self, id: &str) -> Option<&TimelineItem> {
        self.timeline.iter().find(|t| t.id == id)
    }

    /// Guests currently assigned to `table_id`.
    pub fn guests_at<'a>(&'a self, table_id: &'a str) -> impl Iterator<Item = &'a Guest> + 'a {
        self.guests.iter().filter(move |g| g.is_seated_at(table_id))
    }
}

/// Field-level merge: every top-level field in `incoming` replaces the one in
/// `existing`; fields only present in `existing` are kept.
pub fn merge_fields(existing: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        existing.insert(key, value);
    }
}
