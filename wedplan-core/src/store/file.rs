//! Local JSON-file document store.
//!
//! The document lives at `<dir>/<document_id>.json`. Writes merge at the
//! field level and replace the file atomically. Subscriptions poll the file
//! and emit whenever its content changes, which also covers edits made by
//! other processes on the same machine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use super::{Delivery, DocumentStore, Subscription};
use crate::error::{WeddingError, WeddingResult};
use crate::model::{WeddingDocument, merge_fields};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    poll_interval: Duration,
}

impl FileStore {
    pub fn new(dir: &Path, document_id: &str, poll_interval: Duration) -> Self {
        FileStore {
            path: dir.join(format!("{document_id}.json")),
            poll_interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_fields(path: &Path) -> WeddingResult<Option<Map<String, Value>>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(Some(map)),
            other => Err(WeddingError::Store(format!(
                "{} does not hold a JSON object (found {})",
                path.display(),
                json_kind(&other)
            ))),
        }
    }

    async fn poll(path: PathBuf, interval: Duration, tx: mpsc::UnboundedSender<Delivery>) {
        // `None` until the first delivery; read errors are compared by message.
        let mut last: Option<Result<Option<Vec<u8>>, String>> = None;

        loop {
            let content = match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.to_string()),
            };

            if last.as_ref() != Some(&content) {
                let delivery = match &content {
                    Ok(None) => Ok(None),
                    Ok(Some(bytes)) => parse_document(bytes).map(Some).map_err(|e| {
                        WeddingError::Store(format!("unreadable {}: {e}", path.display()))
                    }),
                    Err(message) => Err(WeddingError::Store(format!(
                        "could not read {}: {message}",
                        path.display()
                    ))),
                };

                if let Err(e) = &delivery {
                    tracing::warn!("{e}");
                }
                if tx.send(delivery).is_err() {
                    return;
                }
                last = Some(content);
            }

            tokio::time::sleep(interval).await;
        }
    }
}

fn parse_document(bytes: &[u8]) -> WeddingResult<WeddingDocument> {
    serde_json::from_slice::<Value>(bytes)
        .map_err(WeddingError::from)
        .and_then(WeddingDocument::from_value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn save(&self, document: &WeddingDocument) -> WeddingResult<()> {
        let mut fields = Self::read_fields(&self.path).await?.unwrap_or_default();
        merge_fields(&mut fields, document.to_fields()?);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(&Value::Object(fields))?;
        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!("saved wedding document to {}", self.path.display());
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = tokio::spawn(Self::poll(self.path.clone(), self.poll_interval, tx));
        Subscription::polled(rx, poller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(dir: &Path) -> FileStore {
        FileStore::new(dir, "default-wedding", Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_save_merges_with_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(
            store.path(),
            json!({ "plannerNotes": "llamar al DJ", "weddingTheme": "Rústico" }).to_string(),
        )
        .unwrap();

        let doc = WeddingDocument {
            wedding_theme: "Mediterráneo".into(),
            ..WeddingDocument::default()
        };
        store.save(&doc).await.unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["plannerNotes"], "llamar al DJ");
        assert_eq!(raw["weddingTheme"], "Mediterráneo");
    }

    #[tokio::test]
    async fn test_subscription_sees_absent_then_saved_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut sub = store.subscribe();

        assert!(matches!(sub.next().await, Some(Ok(None))));

        let doc = WeddingDocument {
            updated_at: 42,
            ..WeddingDocument::default()
        };
        store.save(&doc).await.unwrap();

        let seen = sub.next().await.unwrap().unwrap().unwrap();
        assert_eq!(seen.updated_at, 42);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_delivered_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();
        let mut sub = store.subscribe();

        let first = tokio::time::timeout(Duration::from_millis(500), sub.next())
            .await
            .expect("first delivery should arrive promptly")
            .unwrap();
        assert!(matches!(first, Err(WeddingError::Store(_))));

        let doc = WeddingDocument {
            updated_at: 7,
            ..WeddingDocument::default()
        };
        std::fs::write(store.path(), serde_json::to_vec(&doc.to_fields().unwrap()).unwrap())
            .unwrap();

        let next = tokio::time::timeout(Duration::from_millis(500), sub.next())
            .await
            .expect("fixed file should be picked up")
            .unwrap()
            .unwrap();
        assert_eq!(next.unwrap().updated_at, 7);
    }

    #[tokio::test]
    async fn test_non_object_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(store.path(), "[1, 2]").unwrap();

        let err = store.save(&WeddingDocument::default()).await.unwrap_err();
        assert!(matches!(err, WeddingError::Store(_)));
    }
}
