//! Export scheduled tasks to an external calendar.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::CALENDAR_SUMMARY_PREFIX;
use crate::error::WeddingResult;
use crate::model::Task;

/// All-day event payload, in the shape calendar APIs accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDate,
    pub end: EventDate,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDate {
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
}

impl CalendarEvent {
    /// Event for a task's due date; `None` when the task is unscheduled.
    pub fn from_task(task: &Task) -> Option<Self> {
        if !task.is_scheduled() {
            return None;
        }

        let description = if task.notes.is_empty() {
            format!("Tarea de planificación: {}", task.category)
        } else {
            task.notes.clone()
        };
        let date = task.due_date.trim().to_string();

        Some(CalendarEvent {
            summary: format!("{CALENDAR_SUMMARY_PREFIX} {}", task.title),
            description,
            start: EventDate { date: date.clone() },
            end: EventDate { date },
            reminders: Reminders { use_default: true },
        })
    }
}

/// Something that can create calendar events.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn insert_event(&self, event: &CalendarEvent) -> WeddingResult<()>;
}

/// Outcome of an export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Tasks that had a due date.
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Insert one event per scheduled task, one at a time. A failure is counted
/// and logged and the export moves on to the next task.
pub async fn export_tasks<C>(api: &C, tasks: &[Task]) -> ExportSummary
where
    C: CalendarApi + ?Sized,
{
    let mut summary = ExportSummary::default();

    for (task, event) in tasks
        .iter()
        .filter_map(|task| CalendarEvent::from_task(task).map(|event| (task, event)))
    {
        summary.total += 1;
        match api.insert_event(&event).await {
            Ok(()) => {
                debug!(task = %task.title, date = %event.start.date, "exported task");
                summary.success += 1;
            }
            Err(e) => {
                warn!(task = %task.title, "failed to export task to calendar: {e}");
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskCategory;

    #[test]
    fn test_event_uses_notes_or_category_description() {
        let mut task = Task::titled("Reservar DJ");
        task.category = TaskCategory::Music;
        task.due_date = "2025-03-01".into();

        let event = CalendarEvent::from_task(&task).unwrap();
        assert_eq!(event.summary, "💍 Boda: Reservar DJ");
        assert_eq!(
            event.description,
            "Tarea de planificación: Música y Entretenimiento"
        );
        assert_eq!(event.start, event.end);
        assert_eq!(event.start.date, "2025-03-01");

        task.notes = "Preguntar por luces".into();
        let event = CalendarEvent::from_task(&task).unwrap();
        assert_eq!(event.description, "Preguntar por luces");
    }

    #[test]
    fn test_unscheduled_task_has_no_event() {
        assert_eq!(CalendarEvent::from_task(&Task::titled("Sin fecha")), None);
    }

    #[test]
    fn test_event_serializes_with_calendar_field_names() {
        let mut task = Task::titled("Prueba");
        task.due_date = "2025-01-02".into();
        let json = serde_json::to_value(CalendarEvent::from_task(&task).unwrap()).unwrap();

        assert_eq!(json["start"]["date"], "2025-01-02");
        assert_eq!(json["end"]["date"], "2025-01-02");
        assert_eq!(json["reminders"]["useDefault"], true);
    }
}
