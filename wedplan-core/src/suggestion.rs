//! AI planning suggestions: prompt construction and response handling.
//!
//! The HTTP call lives in the provider crate; everything here is pure so the
//! parsing rules can be tested without a network.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::{Task, TaskCategory};

/// How many suggestions to ask for.
pub const SUGGESTION_COUNT: usize = 5;

/// A missing item the assistant thinks the plan needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    /// Free text; may or may not match a known category label.
    pub category: String,
    pub reason: String,
}

impl Suggestion {
    /// Turn the suggestion into a draft task ready to be added.
    pub fn into_task(self) -> Task {
        Task {
            title: self.title,
            category: TaskCategory::from(self.category),
            notes: self.reason,
            ..Task::draft()
        }
    }
}

/// Prompt asking for the items missing from `tasks` given the theme.
pub fn suggestion_prompt(tasks: &[Task], theme: &str) -> String {
    let summary = tasks
        .iter()
        .map(|t| format!("{} ({})", t.title, t.status))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Basándote en estas tareas de boda existentes: {summary} y el tema \"{theme}\", \
         ¿qué {SUGGESTION_COUNT} elementos críticos faltan en mi planificador? \
         Responde en ESPAÑOL como un array JSON de objetos con \"title\", \"category\" y \
         \"reason\". Usa categorías estándar de bodas."
    )
}

/// Prompt for help with the vows in a given tone.
pub fn vows_prompt(current_vows: &str, tone: &str) -> String {
    if current_vows.trim().is_empty() {
        format!(
            "Escribe un borrador breve de votos matrimoniales en ESPAÑOL con un tono {tone}. \
             Responde solo con el texto de los votos."
        )
    } else {
        format!(
            "Mejora estos votos matrimoniales manteniendo su esencia, con un tono {tone}. \
             Responde en ESPAÑOL solo con el texto revisado.\n\n{current_vows}"
        )
    }
}

/// Parse the assistant's reply. Anything malformed yields no suggestions
/// rather than an error; items missing a field are dropped.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    let value: Value = match serde_json::from_str(text.trim()) {
        Ok(value) => value,
        Err(e) => {
            warn!("suggestion response is not JSON: {e}");
            return Vec::new();
        }
    };

    let Value::Array(items) = value else {
        warn!("suggestion response is not a JSON array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Suggestion>(item).ok())
        .filter(|s| !s.title.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    #[test]
    fn test_prompt_lists_tasks_with_status_and_theme() {
        let mut a = Task::titled("Reservar Lugar");
        a.status = TaskStatus::Done;
        let b = Task::titled("Vestido");

        let prompt = suggestion_prompt(&[a, b], "Boho");
        assert!(prompt.contains("Reservar Lugar (Completado), Vestido (Por hacer)"));
        assert!(prompt.contains("\"Boho\""));
        assert!(prompt.contains("5 elementos"));
    }

    #[test]
    fn test_parses_well_formed_reply() {
        let reply = r#"[
            {"title": "Contratar fotógrafo", "category": "Foto y Video", "reason": "Recuerdos"},
            {"title": "Licencia", "category": "Papeleo", "reason": "Obligatorio"}
        ]"#;

        let suggestions = parse_suggestions(reply);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].title, "Contratar fotógrafo");
    }

    #[test]
    fn test_malformed_reply_yields_nothing() {
        assert!(parse_suggestions("lo siento, no puedo").is_empty());
        assert!(parse_suggestions(r#"{"title": "x"}"#).is_empty());
        assert!(parse_suggestions("").is_empty());
    }

    #[test]
    fn test_items_missing_fields_are_dropped() {
        let reply = r#"[{"title": "Sin razón", "category": "Otros"}, {"title": "Ok", "category": "Otros", "reason": "r"}]"#;
        let suggestions = parse_suggestions(reply);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Ok");
    }

    #[test]
    fn test_into_task_maps_category_and_reason() {
        let task = Suggestion {
            title: "Contratar fotógrafo".into(),
            category: "Foto y Video".into(),
            reason: "Recuerdos".into(),
        }
        .into_task();
        assert_eq!(task.category, TaskCategory::PhotoVideo);
        assert_eq!(task.notes, "Recuerdos");
        assert_eq!(task.status, TaskStatus::Todo);

        let task = Suggestion {
            title: "Licencia".into(),
            category: "Papeleo".into(),
            reason: String::new(),
        }
        .into_task();
        assert_eq!(task.category, TaskCategory::Other);
    }

    #[test]
    fn test_vows_prompt_includes_existing_text() {
        assert!(vows_prompt("Te prometo", "romántico").contains("Te prometo"));
        assert!(vows_prompt("  ", "divertido").contains("borrador"));
    }
}
