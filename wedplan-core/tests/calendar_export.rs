use std::sync::Mutex;

use async_trait::async_trait;

use wedplan_core::calendar::{CalendarApi, CalendarEvent, ExportSummary, export_tasks};
use wedplan_core::model::Task;
use wedplan_core::{WeddingError, WeddingResult};

/// Records every event and rejects summaries containing "Fallo".
#[derive(Default)]
struct FakeCalendar {
    inserted: Mutex<Vec<CalendarEvent>>,
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn insert_event(&self, event: &CalendarEvent) -> WeddingResult<()> {
        if event.summary.contains("Fallo") {
            return Err(WeddingError::Remote("400 Bad Request".into()));
        }
        self.inserted.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn scheduled(title: &str, due: &str) -> Task {
    let mut task = Task::titled(title);
    task.due_date = due.into();
    task
}

#[tokio::test]
async fn one_failure_does_not_stop_the_export() {
    let calendar = FakeCalendar::default();
    let tasks = vec![
        scheduled("Reservar lugar", "2025-01-10"),
        scheduled("Fallo de prueba", "2025-02-10"),
        Task::titled("Sin fecha"),
        scheduled("Probar menú", "2025-03-10"),
    ];

    let summary = export_tasks(&calendar, &tasks).await;

    assert_eq!(
        summary,
        ExportSummary {
            total: 3,
            success: 2,
            failed: 1
        }
    );
    let inserted = calendar.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted[1].summary, "💍 Boda: Probar menú");
    assert_eq!(inserted[1].start.date, "2025-03-10");
}

#[tokio::test]
async fn nothing_scheduled_exports_nothing() {
    let calendar = FakeCalendar::default();
    let summary = export_tasks(&calendar, &[Task::titled("Sin fecha")]).await;
    assert_eq!(summary, ExportSummary::default());
}
