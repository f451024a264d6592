//! In-process document store.
//!
//! Behaves like a remote store (field-level merge, echo of every write to all
//! subscribers) without any I/O. Also lets callers stand in for another
//! device writing the same document, inject latency, and make saves fail.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use super::{Delivery, DocumentStore, Snapshot, Subscription};
use crate::error::{WeddingError, WeddingResult};
use crate::model::{WeddingDocument, merge_fields};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    fields: Option<Map<String, Value>>,
    subscribers: Vec<mpsc::UnboundedSender<Delivery>>,
    saves: Vec<WeddingDocument>,
    latency: Duration,
    failure: Option<String>,
}

impl Inner {
    fn current(&self) -> Delivery {
        match self.fields.clone() {
            Some(fields) => WeddingDocument::from_value(Value::Object(fields)).map(Some),
            None => Ok(None),
        }
    }

    fn broadcast(&mut self) {
        let delivery = self.current();
        if let Err(e) = &delivery {
            tracing::error!("memory store holds an unreadable document: {e}");
        }
        self.subscribers
            .retain(|tx| tx.send(copy_delivery(&delivery)).is_ok());
    }

    fn merge(&mut self, incoming: Map<String, Value>) {
        match &mut self.fields {
            Some(existing) => merge_fields(existing, incoming),
            None => self.fields = Some(incoming),
        }
    }
}

fn copy_delivery(delivery: &Delivery) -> Delivery {
    match delivery {
        Ok(snapshot) => Ok(snapshot.clone()),
        Err(e) => Err(WeddingError::Store(e.to_string())),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `document`.
    pub fn with_document(document: &WeddingDocument) -> WeddingResult<Self> {
        let store = Self::new();
        store.lock().fields = Some(document.to_fields()?);
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Documents passed to `save`, in call order (including failed ones).
    pub fn saves(&self) -> Vec<WeddingDocument> {
        self.lock().saves.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves.len()
    }

    /// The stored document, if there is one and it can be read.
    pub fn current(&self) -> Snapshot {
        self.lock().current().ok().flatten()
    }

    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    /// Delay every save by `latency` before it lands.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Make subsequent saves fail with `reason` (or succeed again with `None`).
    pub fn set_failure(&self, reason: Option<&str>) {
        self.lock().failure = reason.map(str::to_string);
    }

    /// Simulate a write from another client: merge and notify subscribers.
    pub fn write_external(&self, document: &WeddingDocument) -> WeddingResult<()> {
        let fields = document.to_fields()?;
        let mut inner = self.lock();
        inner.merge(fields);
        inner.broadcast();
        Ok(())
    }

    /// Re-deliver the current state to every subscriber.
    pub fn redeliver(&self) {
        self.lock().broadcast();
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, document: &WeddingDocument) -> WeddingResult<()> {
        let latency = {
            let mut inner = self.lock();
            inner.saves.push(document.clone());
            inner.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let fields = document.to_fields()?;
        let mut inner = self.lock();
        if let Some(reason) = inner.failure.clone() {
            return Err(WeddingError::Store(reason));
        }
        inner.merge(fields);
        inner.broadcast();
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        let (tx, subscription) = Subscription::channel();
        let mut inner = self.lock();
        if tx.send(inner.current()).is_ok() {
            inner.subscribers.push(tx);
        }
        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_delivers_current_state_first() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe();
        assert!(matches!(sub.next().await, Some(Ok(None))));

        let doc = WeddingDocument::default();
        store.save(&doc).await.unwrap();
        let echoed = sub.next().await.unwrap().unwrap().unwrap();
        assert_eq!(echoed.wedding_theme, doc.wedding_theme);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_remote_untouched() {
        let store = MemoryStore::new();
        store.set_failure(Some("offline"));

        let err = store.save(&WeddingDocument::default()).await.unwrap_err();
        assert!(matches!(err, WeddingError::Store(_)));
        assert_eq!(store.current(), None);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let store = MemoryStore::new();
        let sub = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
    }
}
