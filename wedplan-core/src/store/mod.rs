//! Document store adapters.
//!
//! The sync core only needs two things from a store: persist the whole
//! document with field-level merge, and push the current document (or its
//! absence) to subscribers, once immediately and again after every change.
//! Delivery is at-least-once; consumers must tolerate duplicates. When the
//! stored document cannot be read, subscribers get the error in its place.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::WeddingResult;
use crate::model::WeddingDocument;

/// One delivery from a subscription: the current remote document, or `None`
/// when it does not exist yet.
pub type Snapshot = Option<WeddingDocument>;

/// What a subscription carries: a snapshot, or why one could not be read.
pub type Delivery = WeddingResult<Snapshot>;

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Persist `document`, overwriting the fields it carries and leaving any
    /// other remote fields untouched.
    async fn save(&self, document: &WeddingDocument) -> WeddingResult<()>;

    /// Start receiving snapshots. The first delivery reflects the current
    /// state, or the error that kept it from being read.
    fn subscribe(&self) -> Subscription;
}

/// Stream of snapshots from a store. Dropping it unsubscribes.
pub struct Subscription {
    snapshots: mpsc::UnboundedReceiver<Delivery>,
    poller: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Subscription fed directly by the store through the paired sender.
    pub fn channel() -> (mpsc::UnboundedSender<Delivery>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            tx,
            Subscription {
                snapshots: rx,
                poller: None,
            },
        )
    }

    /// Subscription fed by a background task that is aborted on unsubscribe.
    pub fn polled(snapshots: mpsc::UnboundedReceiver<Delivery>, poller: JoinHandle<()>) -> Self {
        Subscription {
            snapshots,
            poller: Some(poller),
        }
    }

    /// Next delivery, or `None` once the store side has gone away.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.snapshots.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.snapshots.close();
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
