//! Tokio driver for [`SyncMachine`].
//!
//! One task owns the machine and the store subscription, so every state
//! change happens on a single logical thread: local edits, inbound snapshots,
//! the debounce timer and save completions are all handled in one `select!`
//! loop. Callers talk to it through [`SyncSession`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::machine::{RemoteOutcome, SyncMachine, SyncState};
use crate::error::{WeddingError, WeddingResult};
use crate::model::WeddingDocument;
use crate::mutation::Mutation;
use crate::store::{Delivery, DocumentStore, Snapshot, Subscription};

const EVENT_CAPACITY: usize = 64;

/// An in-flight save, yielding the `updatedAt` it wrote and its outcome.
type SaveFuture = Pin<Box<dyn Future<Output = (i64, WeddingResult<()>)> + Send>>;

/// First-load outcome: `None` while waiting, then loaded or the read error.
type Readiness = Option<Result<(), String>>;

/// Notifications for the view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Loaded { created: bool },
    RemoteApplied,
    EchoSkipped,
    Saved { updated_at: i64 },
    SaveFailed(String),
    /// The store could not deliver the document.
    RemoteError(String),
}

enum Command {
    Apply {
        mutation: Mutation,
        reply: oneshot::Sender<WeddingResult<()>>,
    },
    Flush {
        reply: oneshot::Sender<WeddingResult<()>>,
    },
    Shutdown,
}

/// Handle to a running sync task.
pub struct SyncSession {
    commands: mpsc::UnboundedSender<Command>,
    document: watch::Receiver<WeddingDocument>,
    state: watch::Receiver<SyncState>,
    ready: watch::Receiver<Readiness>,
    events: broadcast::Sender<SyncEvent>,
    task: JoinHandle<()>,
}

impl SyncSession {
    /// Subscribe to `store` and start syncing. Must be called inside a tokio
    /// runtime.
    pub fn start<S: DocumentStore>(store: Arc<S>, debounce: Duration) -> Self {
        Self::start_with(store, WeddingDocument::default(), debounce)
    }

    /// Like [`start`](Self::start) with a custom pre-load document.
    pub fn start_with<S: DocumentStore>(
        store: Arc<S>,
        initial: WeddingDocument,
        debounce: Duration,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (document_tx, document_rx) = watch::channel(initial.clone());
        let (state_tx, state_rx) = watch::channel(SyncState::Uninitialized);
        let (ready_tx, ready_rx) = watch::channel(None);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let subscription = store.subscribe();
        let driver = Driver {
            store,
            machine: SyncMachine::new(initial, debounce),
            subscription: Some(subscription),
            document_tx,
            state_tx,
            ready_tx,
            events: events_tx.clone(),
            flush_waiters: Vec::new(),
            last_save_error: None,
        };
        let task = tokio::spawn(driver.run(commands_rx));

        SyncSession {
            commands: commands_tx,
            document: document_rx,
            state: state_rx,
            ready: ready_rx,
            events: events_tx,
            task,
        }
    }

    /// Apply a local edit. Resolves once the edit is part of the local
    /// document; saving happens later, after the debounce window.
    pub async fn apply(&self, mutation: Mutation) -> WeddingResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Apply { mutation, reply })?;
        rx.await.map_err(|_| WeddingError::SessionClosed)?
    }

    /// Save any unsaved edits now and wait until the document is in sync.
    pub async fn flush(&self) -> WeddingResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush { reply })?;
        rx.await.map_err(|_| WeddingError::SessionClosed)?
    }

    /// Wait for the first snapshot from the store. Fails as soon as the
    /// store reports that the document could not be read.
    pub async fn ready(&self) -> WeddingResult<()> {
        let mut ready = self.ready.clone();
        let outcome = ready
            .wait_for(Option::is_some)
            .await
            .map_err(|_| WeddingError::SessionClosed)?
            .clone();

        match outcome {
            Some(Err(message)) => Err(WeddingError::Store(message)),
            _ => Ok(()),
        }
    }

    /// Current local document.
    pub fn document(&self) -> WeddingDocument {
        self.document.borrow().clone()
    }

    pub fn watch_document(&self) -> watch::Receiver<WeddingDocument> {
        self.document.clone()
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Unsubscribe from the store and stop. A pending (debounced) save is
    /// discarded; a save already in flight is allowed to finish.
    pub async fn shutdown(self) -> WeddingResult<()> {
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| WeddingError::Store(format!("sync task failed: {e}")))
    }

    fn send(&self, command: Command) -> WeddingResult<()> {
        self.commands
            .send(command)
            .map_err(|_| WeddingError::SessionClosed)
    }
}

struct Driver<S> {
    store: Arc<S>,
    machine: SyncMachine,
    subscription: Option<Subscription>,
    document_tx: watch::Sender<WeddingDocument>,
    state_tx: watch::Sender<SyncState>,
    ready_tx: watch::Sender<Readiness>,
    events: broadcast::Sender<SyncEvent>,
    flush_waiters: Vec<oneshot::Sender<WeddingResult<()>>>,
    last_save_error: Option<String>,
}

impl<S: DocumentStore> Driver<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut in_flight: Option<SaveFuture> = None;

        loop {
            let deadline = self.machine.deadline();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Apply { mutation, reply }) => {
                        let result = self.machine.apply_local(mutation, Instant::now());
                        if let Err(e) = &result {
                            debug!("rejected local edit: {e}");
                        }
                        let _ = reply.send(result);
                    }
                    Some(Command::Flush { reply }) => {
                        self.flush_waiters.push(reply);
                        if in_flight.is_none() {
                            in_flight = self.start_save(None);
                        }
                        self.resolve_flush_waiters(in_flight.is_some());
                    }
                    Some(Command::Shutdown) | None => break,
                },

                delivery = next_delivery(&mut self.subscription) => match delivery {
                    Some(Ok(snapshot)) => self.on_snapshot(snapshot),
                    Some(Err(e)) => self.on_remote_error(e),
                    None => {
                        warn!("document store closed the subscription");
                        self.subscription = None;
                    }
                },

                (updated_at, result) = wait_save(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.on_save_done(updated_at, result);
                    if !self.flush_waiters.is_empty() {
                        in_flight = self.start_save(None);
                    }
                    self.resolve_flush_waiters(in_flight.is_some());
                },

                _ = wait_until(deadline), if in_flight.is_none() => {
                    in_flight = self.start_save(Some(Instant::now()));
                },
            }

            self.publish();
        }

        self.teardown(in_flight).await;
    }

    fn on_snapshot(&mut self, snapshot: Snapshot) {
        match self.machine.apply_remote(snapshot, Instant::now()) {
            RemoteOutcome::Initialized { created } => {
                if created {
                    info!("no wedding document in store yet, it will be created");
                } else {
                    info!("loaded wedding document from store");
                }
                self.ready_tx.send_replace(Some(Ok(())));
                self.emit(SyncEvent::Loaded { created });
            }
            RemoteOutcome::Applied => {
                info!("applied external change to wedding document");
                self.emit(SyncEvent::RemoteApplied);
            }
            RemoteOutcome::EchoSkipped => {
                debug!("skipped echo of our own save");
                self.emit(SyncEvent::EchoSkipped);
            }
            RemoteOutcome::Unchanged => debug!("snapshot matches local document"),
            RemoteOutcome::Ignored => debug!("remote document absent, keeping local state"),
        }
    }

    /// A read failure before the first snapshot fails `ready()`; after that the
    /// local document is kept and the next good snapshot is applied as usual.
    fn on_remote_error(&mut self, e: WeddingError) {
        let message = e.to_string();
        if self.machine.state() == SyncState::Uninitialized {
            error!("could not load wedding document: {message}");
            self.ready_tx.send_replace(Some(Err(message.clone())));
        } else {
            warn!("document store error, keeping local state: {message}");
        }
        self.emit(SyncEvent::RemoteError(message));
    }

    /// Start a save: when due if `now` is given, otherwise immediately.
    fn start_save(&mut self, now: Option<Instant>) -> Option<SaveFuture> {
        let wall_clock = Utc::now().timestamp_millis();
        let document = match now {
            Some(now) => self.machine.begin_save(now, wall_clock),
            None => self.machine.begin_save_now(wall_clock),
        }?;

        let updated_at = document.updated_at;
        debug!(updated_at, "saving wedding document");
        let store = Arc::clone(&self.store);
        Some(Box::pin(async move { (updated_at, store.save(&document).await) }))
    }

    /// `updated_at` is the version that was written, which may no longer be
    /// the local one if an external change arrived meanwhile.
    fn on_save_done(&mut self, updated_at: i64, result: WeddingResult<()>) {
        self.machine.finish_save(Instant::now());

        match result {
            Ok(()) => {
                info!(updated_at, "wedding document saved");
                self.last_save_error = None;
                self.emit(SyncEvent::Saved { updated_at });
            }
            Err(e) => {
                error!("failed to save wedding document: {e}");
                let message = e.to_string();
                self.last_save_error = Some(message.clone());
                self.emit(SyncEvent::SaveFailed(message));
            }
        }
    }

    fn resolve_flush_waiters(&mut self, saving: bool) {
        if saving || self.machine.state() == SyncState::Dirty {
            return;
        }

        for waiter in self.flush_waiters.drain(..) {
            let result = match &self.last_save_error {
                Some(message) => Err(WeddingError::Store(message.clone())),
                None => Ok(()),
            };
            let _ = waiter.send(result);
        }
    }

    async fn teardown(mut self, in_flight: Option<SaveFuture>) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.machine.cancel_pending();

        if let Some(save) = in_flight {
            let (updated_at, result) = save.await;
            self.on_save_done(updated_at, result);
        }

        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(Err(WeddingError::SessionClosed));
        }
        self.publish();
        debug!("sync session stopped");
    }

    fn publish(&self) {
        let document = self.machine.document();
        self.document_tx.send_if_modified(|current| {
            if *current == *document {
                return false;
            }
            *current = document.clone();
            true
        });
        self.state_tx.send_if_modified(|current| {
            let changed = *current != self.machine.state();
            *current = self.machine.state();
            changed
        });
    }

    /// Watchers see the new state before the event announcing it.
    fn emit(&self, event: SyncEvent) {
        self.publish();
        let _ = self.events.send(event);
    }
}

async fn next_delivery(subscription: &mut Option<Subscription>) -> Option<Delivery> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

async fn wait_save(in_flight: &mut Option<SaveFuture>) -> (i64, WeddingResult<()>) {
    match in_flight {
        Some(save) => save.await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
