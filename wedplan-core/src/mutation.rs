//! Local edits proposed by the view layer.
//!
//! Every edit is a [`Mutation`]: a new entity, an id plus a patch of the
//! fields to change, or an id to remove. Mutations are applied synchronously
//! to a [`WeddingDocument`]; a rejected mutation leaves the document untouched.

use crate::error::{WeddingError, WeddingResult};
use crate::model::{
    Guest, GuestGroup, GuestSide, Table, Task, TaskCategory, TaskStatus, TimelineItem,
    WeddingDocument, normalize_time, sort_timeline,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetWeddingDate(String),
    SetWeddingTheme(String),
    SetVows(String),
    SetCoupleImage(Option<String>),

    AddTask(Task),
    UpdateTask(String, TaskPatch),
    DeleteTask(String),

    AddGuest(Guest),
    UpdateGuest(String, GuestPatch),
    DeleteGuest(String),
    /// Seat a guest at a table, or unseat them with `None`.
    AssignSeat {
        guest_id: String,
        table_id: Option<String>,
    },

    AddTable(Table),
    UpdateTable(String, TablePatch),
    DeleteTable(String),

    AddTimelineItem(TimelineItem),
    UpdateTimelineItem(String, TimelineItemPatch),
    DeleteTimelineItem(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub category: Option<TaskCategory>,
    pub status: Option<TaskStatus>,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub supplier: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub group: Option<GuestGroup>,
    pub side: Option<GuestSide>,
    pub confirmed: Option<bool>,
    pub dietary_notes: Option<String>,
    pub table_id: Option<Option<String>>,
    pub table_number: Option<Option<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePatch {
    pub name: Option<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineItemPatch {
    pub time: Option<String>,
    pub activity: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl TaskPatch {
    fn validate(&self) -> WeddingResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_amount("budget", self.budget)?;
        validate_amount("actual cost", self.actual_cost)
    }

    fn apply_to(self, task: &mut Task) {
        if let Some(v) = self.title {
            task.title = v;
        }
        if let Some(v) = self.category {
            task.category = v;
        }
        if let Some(v) = self.status {
            task.status = v;
        }
        if let Some(v) = self.budget {
            task.budget = v;
        }
        if let Some(v) = self.actual_cost {
            task.actual_cost = v;
        }
        if let Some(v) = self.due_date {
            task.due_date = v;
        }
        if let Some(v) = self.notes {
            task.notes = v;
        }
        if let Some(v) = self.color {
            task.color = v;
        }
        if let Some(v) = self.icon {
            task.icon = v;
        }
        if let Some(v) = self.supplier {
            task.supplier = v;
        }
    }
}

impl GuestPatch {
    fn apply_to(self, guest: &mut Guest) {
        if let Some(v) = self.name {
            guest.name = v;
        }
        if let Some(v) = self.group {
            guest.group = v;
        }
        if let Some(v) = self.side {
            guest.side = v;
        }
        if let Some(v) = self.confirmed {
            guest.confirmed = v;
        }
        if let Some(v) = self.dietary_notes {
            guest.dietary_notes = v;
        }
        if let Some(v) = self.table_id {
            guest.table_id = v;
        }
        if let Some(v) = self.table_number {
            guest.table_number = v;
        }
    }
}

impl TablePatch {
    fn apply_to(self, table: &mut Table) {
        if let Some(v) = self.name {
            table.name = v;
        }
        if let Some(v) = self.capacity {
            table.capacity = v;
        }
    }
}

impl TimelineItemPatch {
    fn apply_to(self, item: &mut TimelineItem) {
        if let Some(v) = self.time {
            item.time = v;
        }
        if let Some(v) = self.activity {
            item.activity = v;
        }
        if let Some(v) = self.location {
            item.location = v;
        }
        if let Some(v) = self.notes {
            item.notes = v;
        }
    }
}

fn validate_title(title: &str) -> WeddingResult<()> {
    if title.trim().is_empty() {
        return Err(WeddingError::Validation("task title cannot be empty".into()));
    }
    Ok(())
}

fn validate_amount(field: &str, amount: Option<f64>) -> WeddingResult<()> {
    match amount {
        Some(v) if !v.is_finite() || v < 0.0 => Err(WeddingError::Validation(format!(
            "{field} must be a non-negative number, got {v}"
        ))),
        _ => Ok(()),
    }
}

fn validate_capacity(capacity: u32) -> WeddingResult<()> {
    if capacity == 0 {
        return Err(WeddingError::Validation("table capacity must be at least 1".into()));
    }
    Ok(())
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    id: &str,
    kind: &'static str,
    id_of: impl Fn(&T) -> &str,
) -> WeddingResult<&'a mut T> {
    items
        .iter_mut()
        .find(|item| id_of(item) == id)
        .ok_or_else(|| WeddingError::not_found(kind, id))
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: &'static str,
    id_of: impl Fn(&T) -> &str,
) -> WeddingResult<()> {
    let before = items.len();
    items.retain(|item| id_of(item) != id);
    if items.len() == before {
        return Err(WeddingError::not_found(kind, id));
    }
    Ok(())
}

impl WeddingDocument {
    /// Apply a local edit. On error nothing has changed.
    pub fn apply(&mut self, mutation: Mutation) -> WeddingResult<()> {
        match mutation {
            Mutation::SetWeddingDate(date) => self.wedding_date = date,
            Mutation::SetWeddingTheme(theme) => self.wedding_theme = theme,
            Mutation::SetVows(vows) => self.vows = vows,
            Mutation::SetCoupleImage(url) => self.couple_image = url,

            Mutation::AddTask(task) => {
                validate_title(&task.title)?;
                validate_amount("budget", Some(task.budget))?;
                validate_amount("actual cost", Some(task.actual_cost))?;
                self.tasks.insert(0, task);
            }
            Mutation::UpdateTask(id, patch) => {
                patch.validate()?;
                let task = find_mut(&mut self.tasks, &id, "task", |t| t.id.as_str())?;
                patch.apply_to(task);
            }
            Mutation::DeleteTask(id) => remove_by_id(&mut self.tasks, &id, "task", |t| t.id.as_str())?,

            Mutation::AddGuest(guest) => self.guests.insert(0, guest),
            Mutation::UpdateGuest(id, patch) => {
                if let Some(Some(table_id)) = &patch.table_id {
                    self.require_table(table_id)?;
                }
                let guest = find_mut(&mut self.guests, &id, "guest", |g| g.id.as_str())?;
                patch.apply_to(guest);
            }
            Mutation::DeleteGuest(id) => remove_by_id(&mut self.guests, &id, "guest", |g| g.id.as_str())?,
            Mutation::AssignSeat { guest_id, table_id } => {
                if let Some(table_id) = &table_id {
                    self.require_table(table_id)?;
                }
                let guest = find_mut(&mut self.guests, &guest_id, "guest", |g| g.id.as_str())?;
                guest.table_id = table_id;
            }

            Mutation::AddTable(table) => {
                validate_capacity(table.capacity)?;
                self.tables.push(table);
            }
            Mutation::UpdateTable(id, patch) => {
                if let Some(capacity) = patch.capacity {
                    validate_capacity(capacity)?;
                }
                let table = find_mut(&mut self.tables, &id, "table", |t| t.id.as_str())?;
                patch.apply_to(table);
            }
            Mutation::DeleteTable(id) => {
                remove_by_id(&mut self.tables, &id, "table", |t| t.id.as_str())?;
                self.unseat_all(&id);
            }

            Mutation::AddTimelineItem(mut item) => {
                item.time = normalize_time(&item.time)?;
                self.timeline.push(item);
                sort_timeline(&mut self.timeline);
            }
            Mutation::UpdateTimelineItem(id, mut patch) => {
                if let Some(time) = &patch.time {
                    patch.time = Some(normalize_time(time)?);
                }
                let item = find_mut(&mut self.timeline, &id, "timeline item", |t| t.id.as_str())?;
                patch.apply_to(item);
                sort_timeline(&mut self.timeline);
            }
            Mutation::DeleteTimelineItem(id) => {
                remove_by_id(&mut self.timeline, &id, "timeline item", |t| t.id.as_str())?
            }
        }

        Ok(())
    }

    fn require_table(&self, table_id: &str) -> WeddingResult<()> {
        match self.table(table_id) {
            Some(_) => Ok(()),
            None => Err(WeddingError::not_found("table", table_id)),
        }
    }

    /// Clear every guest's reference to `table_id`.
    fn unseat_all(&mut self, table_id: &str) {
        for guest in self.guests.iter_mut().filter(|g| g.is_seated_at(table_id)) {
            guest.table_id = None;
        }
    }
}
