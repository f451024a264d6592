//! Planning tasks (checklist + budget ledger rows).

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TASK_COLOR, DEFAULT_TASK_ICON};
use crate::id::new_id;

labelled_enum! {
    /// Planning area a task belongs to.
    TaskCategory, fallback = Other {
        Venue => "Lugar y Catering",
        Attire => "Vestimenta y Belleza",
        Guests => "Invitados e Invitaciones",
        PhotoVideo => "Foto y Video",
        Decor => "Flores y Decoración",
        Music => "Música y Entretenimiento",
        Legal => "Legal y Trámites",
        Other => "Otros",
    }
}

labelled_enum! {
    TaskStatus, fallback = Todo {
        Todo => "Por hacer",
        InProgress => "En progreso",
        Done => "Completado",
        PendingPayment => "Pago pendiente",
    }
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub actual_cost: f64,
    /// `YYYY-MM-DD`, empty when unscheduled.
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

fn default_color() -> String {
    DEFAULT_TASK_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_TASK_ICON.to_string()
}

impl Task {
    /// A blank task with a fresh id, ready to be filled in before it is added.
    pub fn draft() -> Self {
        Task {
            id: new_id(),
            title: String::new(),
            category: TaskCategory::Other,
            status: TaskStatus::Todo,
            budget: 0.0,
            actual_cost: 0.0,
            due_date: String::new(),
            notes: String::new(),
            color: default_color(),
            icon: default_icon(),
            supplier: Some(String::new()),
        }
    }

    pub fn titled(title: &str) -> Self {
        Task {
            title: title.to_string(),
            ..Task::draft()
        }
    }

    pub fn is_scheduled(&self) -> bool {
        !self.due_date.trim().is_empty()
    }

    /// Remaining budget headroom; negative when over budget.
    pub fn variance(&self) -> f64 {
        self.budget - self.actual_cost
    }
}

/// Sample tasks used when a document carries no task list yet.
pub fn initial_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "1".to_string(),
            title: "Reservar el lugar principal".to_string(),
            category: TaskCategory::Venue,
            status: TaskStatus::Done,
            budget: 5000.0,
            actual_cost: 5500.0,
            due_date: "2024-06-01".to_string(),
            notes: "Incluye catering y decoración básica.".to_string(),
            color: "#fee2e2".to_string(),
            icon: "💒".to_string(),
            supplier: Some("Hacienda Los Olivos".to_string()),
        },
        Task {
            id: "2".to_string(),
            title: "Elegir el vestido de novia".to_string(),
            category: TaskCategory::Attire,
            status: TaskStatus::InProgress,
            budget: 2000.0,
            actual_cost: 0.0,
            due_date: "2024-08-15".to_string(),
            notes: "Buscando en tiendas del centro.".to_string(),
            color: "#e0e7ff".to_string(),
            icon: "👗".to_string(),
            supplier: Some("Boutique Nupcial".to_string()),
        },
    ]
}
